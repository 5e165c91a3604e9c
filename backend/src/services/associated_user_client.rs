//! Client for the WISP management service's associated users resource.
//!
//! Each WISP exposes its own management endpoint and credentials, so the
//! client is shared and the target is chosen per call.

use std::time::Duration;

use reqwest::{Client, StatusCode};

use crate::error::{AppError, Result};
use crate::models::{AssociatedUser, LookupScope, Wisp};

/// Path of the associated users collection, relative to the management URL.
const ASSOCIATED_USERS_PATH: &str = "/associated_users.json";

pub struct AssociatedUserClient {
    client: Client,
}

impl AssociatedUserClient {
    pub fn new(timeout_secs: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { client })
    }

    /// Users associated with `hostname` according to `wisp`'s management
    /// service. `LookupScope::First` returns at most one user.
    pub async fn fetch(
        &self,
        wisp: &Wisp,
        hostname: &str,
        scope: LookupScope,
    ) -> Result<Vec<AssociatedUser>> {
        let base_url = wisp
            .owmw_url
            .as_deref()
            .filter(|url| !url.trim().is_empty())
            .ok_or_else(|| {
                AppError::Validation(format!(
                    "WISP '{}' has no management service configured",
                    wisp.name
                ))
            })?;
        let url = format!("{}{}", base_url.trim_end_matches('/'), ASSOCIATED_USERS_PATH);

        let mut request = self
            .client
            .get(&url)
            .query(&[("access_point", hostname)]);
        if let Some(username) = &wisp.owmw_username {
            request = request.basic_auth(username, wisp.owmw_password.as_ref());
        }

        let response = request.send().await.map_err(|e| {
            tracing::warn!(wisp_id = wisp.id, error = %e, "Associated users lookup failed");
            AppError::Upstream(format!("Management service unreachable: {}", e))
        })?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(AppError::Upstream(format!(
                "Management service rejected credentials of WISP '{}'",
                wisp.name
            )));
        }
        if !status.is_success() {
            return Err(AppError::Upstream(format!(
                "Management service returned HTTP {}",
                status
            )));
        }

        let mut users: Vec<AssociatedUser> = response
            .json()
            .await
            .map_err(|e| AppError::Upstream(format!("Invalid associated users payload: {}", e)))?;

        if scope == LookupScope::First {
            users.truncate(1);
        }

        tracing::debug!(
            wisp_id = wisp.id,
            hostname,
            count = users.len(),
            "Associated users fetched"
        );
        Ok(users)
    }

    /// First associated user, if any.
    pub async fn fetch_first(&self, wisp: &Wisp, hostname: &str) -> Result<Option<AssociatedUser>> {
        Ok(self
            .fetch(wisp, hostname, LookupScope::First)
            .await?
            .into_iter()
            .next())
    }
}
