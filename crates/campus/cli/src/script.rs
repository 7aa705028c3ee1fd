//! Request scripts
//!
//! A script is a JSON array of steps. Each step names a module, an entry
//! point and its arguments; `caller` defaults to the campus owner.

use std::path::Path;

use campus_runtime::{Campus, CampusError, Request, Response};
use campus_types::{AccountId, ModuleKind};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{CliError, CliResult};

#[derive(Debug, Clone, Deserialize)]
pub struct Step {
    #[serde(default)]
    pub caller: Option<AccountId>,
    pub module: ModuleKind,
    pub entry: String,
    #[serde(default)]
    pub args: Value,
}

impl Step {
    pub fn request(&self, owner: AccountId) -> Request {
        Request::new(
            self.caller.unwrap_or(owner),
            self.module,
            self.entry.clone(),
            self.args.clone(),
        )
    }
}

pub fn load(path: &Path) -> CliResult<Vec<Step>> {
    let contents = std::fs::read_to_string(path)?;
    serde_json::from_str(&contents).map_err(|e| CliError::Script {
        path: path.display().to_string(),
        message: e.to_string(),
    })
}

/// Outcome of one executed step
pub struct Outcome {
    pub index: usize,
    pub request: Request,
    pub result: Result<Response, CampusError>,
}

impl Outcome {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// Execute steps in order, defaulting callers to `owner`. With `fail_fast`
/// execution stops after the first hard error.
pub fn run(campus: &Campus, steps: &[Step], owner: AccountId, fail_fast: bool) -> Vec<Outcome> {
    let mut outcomes = Vec::with_capacity(steps.len());
    for (index, step) in steps.iter().enumerate() {
        let request = step.request(owner);
        debug!(step = index, module = %request.module, entry = %request.entry, "Executing step");
        let result = campus.execute(&request);
        let failed = result.is_err();
        if let Err(e) = &result {
            warn!(step = index, error = %e, "Step failed");
        }
        outcomes.push(Outcome {
            index,
            request,
            result,
        });
        if failed && fail_fast {
            break;
        }
    }
    outcomes
}
