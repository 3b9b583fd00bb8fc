use std::path::PathBuf;

use rusqlite::Connection;
use serde::Deserialize;

use crate::calc::WeightTable;
use crate::store::Store;

#[derive(Debug, Deserialize, Clone)]
pub struct Request {
    pub id: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

pub struct AppState {
    pub workspace: Option<PathBuf>,
    pub db: Option<Connection>,
    pub weights: WeightTable,
    pub store: Store,
}

impl AppState {
    pub fn new(weights: WeightTable) -> Self {
        Self {
            workspace: None,
            db: None,
            weights,
            store: Store::default(),
        }
    }
}
