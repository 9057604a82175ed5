use super::report;
use crate::utils;
use tpufleet_cloud::{Reconciler, RetryPolicy};
use tpufleet_core::{DesiredFleet, Generation};

pub async fn handle(fleet: &DesiredFleet, generation: Option<Generation>) -> anyhow::Result<bool> {
    let specs = utils::select_specs(fleet, generation)?;
    if specs.is_empty() {
        return Ok(true);
    }

    let provider = utils::connect_provider(fleet).await?;
    let reconciler = Reconciler::new(&provider, RetryPolicy::from_settings(&fleet.general));

    let mut ok = true;
    for spec in &specs {
        report::print_header(spec);
        match reconciler.assess(spec).await {
            Ok(assessment) => report::print_assessment(&assessment),
            Err(e) => {
                report::print_error(spec, &e);
                ok = false;
            }
        }
    }

    Ok(ok)
}
