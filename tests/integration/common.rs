//! Shared fixtures.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value};

use demografi::dataset::{DatasetLoader, DatasetSnapshot};
use demografi::error::{PlannerError, Result};
use demografi::plan::RawPlan;
use demografi::planner::PlanGenerator;

/// Header plus six rows. Total weight is 26.5.
pub const FIXTURE_CSV: &str = "\
jantina,umur,daerah,negeri,etnik,oku,pendidikan_tertinggi,pekerjaan_utama,COUNT
Lelaki,20,Johor Bahru,Johor,Melayu,Bukan OKU,SPM,Petani,5
Perempuan,40,Muar,Johor,Cina,OKU,Ijazah,Guru,3
Lelaki,35,Ipoh,Perak,India,Bukan OKU,SPM,Guru,2.5
Perempuan,,Kuantan,Pahang,Melayu,NA,,Tiada Pekerjaan,4
Perempuan,67,Ipoh,Perak,Melayu,OKU,Tiada Pendidikan Formal,Bersara,7
Lelaki,17,Kuantan,Pahang,Lain-lain,Bukan OKU,PT3,Pelajar,5
";

pub fn snapshot() -> DatasetSnapshot {
    DatasetLoader::default()
        .load_reader(FIXTURE_CSV.as_bytes())
        .expect("fixture loads")
}

pub fn raw(value: Value) -> RawPlan {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

/// Plan generator that returns a fixed value.
pub struct StubPlanner {
    pub plan: Value,
}

impl StubPlanner {
    pub fn new(plan: Value) -> Arc<Self> {
        Arc::new(Self { plan })
    }
}

#[async_trait]
impl PlanGenerator for StubPlanner {
    async fn generate(&self, _question: &str) -> Result<RawPlan> {
        match &self.plan {
            Value::Object(map) => Ok(map.clone()),
            other => {
                Err(PlannerError::InvalidPlan(format!("expected an object, got {other}")).into())
            }
        }
    }

    fn name(&self) -> &str {
        "stub"
    }
}

/// Plan generator whose upstream is unavailable.
pub struct FailingPlanner;

#[async_trait]
impl PlanGenerator for FailingPlanner {
    async fn generate(&self, _question: &str) -> Result<RawPlan> {
        Err(PlannerError::Api("upstream unavailable".to_string()).into())
    }

    fn name(&self) -> &str {
        "failing"
    }
}
