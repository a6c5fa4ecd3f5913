#![warn(missing_docs)]

//! Wire types shared between the forcetest orchestration core and the
//! platform tooling API.
//!
//! These types mirror the JSON shapes the tooling service produces: sobject
//! records use PascalCase field names, test-run results use camelCase. All
//! collection fields on [`TestRunResult`] default to empty so that partial
//! responses decode without errors.

mod artifact;
mod errors;
mod test_run;

pub use artifact::*;
pub use errors::*;
pub use test_run::*;
