//! Creation driver
//!
//! Issues one create call per missing member, sequentially, retrying each
//! failed call with a fixed delay until the retry policy is exhausted.

use crate::action::{ActionType, ApplyResult, Plan};
use crate::error::{CloudError, Result};
use crate::provider::{CreateNodeRequest, TpuProvider};
use crate::retry::RetryPolicy;

pub struct CreationDriver<'a> {
    provider: &'a dyn TpuProvider,
    policy: RetryPolicy,
}

impl<'a> CreationDriver<'a> {
    pub fn new(provider: &'a dyn TpuProvider, policy: RetryPolicy) -> Self {
        Self { provider, policy }
    }

    /// Create one node, retrying the same request on failure.
    ///
    /// Returns the number of create calls issued.
    pub async fn create(&self, request: &CreateNodeRequest) -> Result<u32> {
        let mut attempts = 0;

        loop {
            attempts += 1;
            tracing::info!(
                node = %request.name,
                zone = %request.zone,
                attempt = attempts,
                "Creating node"
            );

            match self.provider.create_node(request).await {
                Ok(()) => return Ok(attempts),
                Err(e) => {
                    tracing::warn!(
                        node = %request.name,
                        attempt = attempts,
                        max_attempts = self.policy.max_attempts,
                        "Create failed: {}",
                        e
                    );

                    if !self.policy.allows_retry(attempts) {
                        return Err(CloudError::CreationExhausted {
                            name: request.name.clone(),
                            attempts,
                            last_error: e.to_string(),
                        });
                    }

                    tokio::time::sleep(self.policy.delay).await;
                }
            }
        }
    }

    /// Apply every `Create` action in order. Stops at the first exhausted action.
    pub async fn apply(&self, plan: &Plan) -> ApplyResult {
        let mut result = ApplyResult::new();
        let start = std::time::Instant::now();

        for action in &plan.actions {
            if action.action_type != ActionType::Create {
                tracing::warn!("Skipping {}: {}", action.request.name, action.description);
                continue;
            }

            match self.create(&action.request).await {
                Ok(attempts) => result.add_success(action, attempts),
                // create only gives up once the policy is used up
                Err(e) => {
                    result.add_failure(action, self.policy.max_attempts, e.to_string());
                    break;
                }
            }
        }

        result.duration_ms = start.elapsed().as_millis() as u64;
        result
    }
}
