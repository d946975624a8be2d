//! App resource operations.

use crate::client::{segment, HerokuClient, NO_BODY};
use crate::error::{HerokuError, HerokuResult};
use crate::types::{AppRecord, AppUpdate, CreateAppRequest};
use crate::validation::validate_app_name;
use reqwest::Method;
use tracing::{debug, info, instrument};

impl HerokuClient {
    /// Create an app. The name is validated before any request is sent.
    #[instrument(skip(self))]
    pub async fn create_app(&self, name: &str) -> HerokuResult<AppRecord> {
        validate_app_name(name)?;

        let app: AppRecord = self
            .execute(Method::POST, "/apps", Some(&CreateAppRequest { name }))
            .await?;

        info!(app_id = %app.id, name = %app.name, "Created app");
        Ok(app)
    }

    /// Get an app by id or name.
    #[instrument(skip(self))]
    pub async fn get_app(&self, id_or_name: &str) -> HerokuResult<AppRecord> {
        self.execute(Method::GET, &app_path(id_or_name), NO_BODY)
            .await
    }

    /// List apps in the order the platform returns them.
    #[instrument(skip(self))]
    pub async fn list_apps(&self) -> HerokuResult<Vec<AppRecord>> {
        let apps: Vec<AppRecord> = self.execute(Method::GET, "/apps", NO_BODY).await?;
        debug!("Listed {} apps", apps.len());
        Ok(apps)
    }

    /// Rename an app and/or toggle maintenance mode.
    ///
    /// Fails with [`HerokuError::NoOp`] when the update is empty, without
    /// sending a request.
    #[instrument(skip(self))]
    pub async fn update_app(&self, id_or_name: &str, update: AppUpdate) -> HerokuResult<AppRecord> {
        if update.is_empty() {
            return Err(HerokuError::NoOp);
        }
        if let Some(name) = &update.name {
            validate_app_name(name)?;
        }

        let app: AppRecord = self
            .execute(Method::PATCH, &app_path(id_or_name), Some(&update))
            .await?;

        info!(app_id = %app.id, name = %app.name, maintenance = app.maintenance, "Updated app");
        Ok(app)
    }

    /// Delete an app, returning its last representation.
    #[instrument(skip(self))]
    pub async fn delete_app(&self, id_or_name: &str) -> HerokuResult<AppRecord> {
        let app: AppRecord = self
            .execute(Method::DELETE, &app_path(id_or_name), NO_BODY)
            .await?;

        info!(app_id = %app.id, name = %app.name, "Deleted app");
        Ok(app)
    }
}

fn app_path(id_or_name: &str) -> String {
    format!("/apps/{}", segment(id_or_name))
}
