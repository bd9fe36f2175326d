use serde::Deserialize;

use super::repo_types::DriUpdate;

#[derive(Debug, Deserialize)]
pub struct PutDriRequest {
    pub entries: Vec<DriUpdate>,
}
