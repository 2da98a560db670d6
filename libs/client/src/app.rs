//! Top-level event handlers
//!
//! Each handler runs one user action to completion. Any failure is shown
//! through [`Prompter::alert`] and leaves the app in the state it was in
//! before the action; handlers return whether the action succeeded.

use std::path::Path;

use common::{
    Rarity,
    models::{Matto, User, UserUpdate},
};
use tracing::warn;
use uuid::Uuid;

use crate::{
    admin::{AdminConsole, Applied, EditModal},
    api::ApiClient,
    config::ClientConfig,
    error::ClientResult,
    prompt::Prompter,
    session::Session,
    upload::{Photo, SubmissionForm},
    views::{Gallery, Leaderboard},
};

pub struct App<P> {
    api: ApiClient,
    session: Session,
    form: SubmissionForm,
    leaderboard: Leaderboard,
    gallery: Gallery,
    admin: AdminConsole,
    prompter: P,
}

impl<P: Prompter> App<P> {
    pub fn new(config: &ClientConfig, prompter: P) -> Self {
        Self::with_api(ApiClient::new(config), config.display_limit, prompter)
    }

    pub fn with_api(api: ApiClient, display_limit: usize, prompter: P) -> Self {
        Self {
            session: Session::new(api.clone()),
            form: SubmissionForm::new(),
            leaderboard: Leaderboard::new(display_limit),
            gallery: Gallery::new(display_limit),
            admin: AdminConsole::new(api.clone()),
            api,
            prompter,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn current_user(&self) -> Option<&User> {
        self.session.current()
    }

    pub fn form(&self) -> &SubmissionForm {
        &self.form
    }

    pub fn leaderboard(&self) -> &Leaderboard {
        &self.leaderboard
    }

    pub fn gallery(&self) -> &Gallery {
        &self.gallery
    }

    pub fn admin(&self) -> &AdminConsole {
        &self.admin
    }

    pub fn prompter(&self) -> &P {
        &self.prompter
    }

    /// First paint: load both public views and wait for them
    pub async fn on_start(&self) {
        self.leaderboard.load(&self.api).await;
        self.gallery.load(&self.api).await;
        self.leaderboard.view().settled().await;
        self.gallery.view().settled().await;
    }

    /// Re-fetch both public views and wait for them
    pub async fn on_refresh(&self) {
        self.leaderboard.refresh(&self.api).await;
        self.gallery.refresh(&self.api).await;
        self.leaderboard.view().settled().await;
        self.gallery.view().settled().await;
    }

    pub async fn on_register(&mut self, username: &str, password: Option<&str>) -> bool {
        let result = self.session.register(username, password).await.map(|_| ());
        self.report(result).is_some()
    }

    pub async fn on_login(&mut self, username: &str, password: &str) -> bool {
        let result = self.session.login(username, password).await.map(|_| ());
        self.report(result).is_some()
    }

    pub fn on_logout(&mut self) {
        self.session.logout();
    }

    pub async fn on_select_photo(&mut self, path: impl AsRef<Path>) -> bool {
        let result = Photo::from_path(path).await;
        match self.report(result) {
            Some(photo) => {
                self.form.select_photo(photo);
                true
            }
            None => false,
        }
    }

    pub fn on_select_photo_bytes(&mut self, file_name: &str, bytes: Vec<u8>) -> bool {
        let result = Photo::from_bytes(file_name, bytes);
        match self.report(result) {
            Some(photo) => {
                self.form.select_photo(photo);
                true
            }
            None => false,
        }
    }

    pub fn on_nickname(&mut self, nickname: &str) {
        self.form.set_nickname(nickname);
    }

    pub fn on_description(&mut self, description: &str) {
        self.form.set_description(description);
    }

    pub fn on_rarity(&mut self, rarity: Rarity) {
        self.form.select_rarity(rarity);
    }

    pub async fn on_my_matti(&self) -> Option<Vec<Matto>> {
        let result = self.session.matti().await;
        self.report(result)
    }

    /// Upload the form, then refresh the views and the player's own record
    pub async fn on_submit(&mut self) -> Option<Matto> {
        let result = self.form.submit(&self.session).await;
        let matto = self.report(result)?;

        self.on_refresh().await;
        let refreshed = self.session.refresh().await.map(|_| ());
        self.report(refreshed);
        Some(matto)
    }

    pub async fn on_admin_unlock(&mut self, password: &str) -> bool {
        let result = self.admin.unlock(password).await;
        self.report_applied(result).is_some()
    }

    pub async fn on_admin_lock(&mut self) {
        let result = self.admin.lock().await;
        self.report(result);
    }

    pub async fn on_admin_refresh(&mut self) -> bool {
        let result = self.admin.refresh_all().await;
        self.report(result).is_some()
    }

    pub async fn on_admin_create_user(&mut self, username: &str, password: &str) -> bool {
        let result = self.admin.create_user(username, password).await;
        self.report_applied(result).is_some()
    }

    pub fn on_admin_edit_user(&self, user: &User) -> EditModal<UserUpdate> {
        self.admin.edit_user(user)
    }

    /// Save an edit modal; on failure the modal stays open
    pub async fn on_admin_save_user(&mut self, modal: &EditModal<UserUpdate>) -> bool {
        let result = modal.save(&mut self.admin).await;
        self.report_applied(result).is_some()
    }

    pub async fn on_admin_moderate_matto(&mut self, id: Uuid, is_approved: bool) -> bool {
        let result = self.admin.moderate_matto(id, is_approved).await;
        self.report_applied(result).is_some()
    }

    pub async fn on_admin_delete_user(&mut self, id: Uuid) -> bool {
        let result = self.admin.delete_user(id, &self.prompter).await;
        self.report_applied(result).is_some()
    }

    pub async fn on_admin_delete_matto(&mut self, id: Uuid) -> bool {
        let result = self.admin.delete_matto(id, &self.prompter).await;
        self.report_applied(result).is_some()
    }

    pub async fn on_admin_reset_points(&mut self) -> bool {
        let result = self.admin.reset_points(&self.prompter).await;
        self.report_applied(result).is_some()
    }

    /// The call's own outcome decides; a failed re-fetch is alerted on its own
    fn report_applied<T>(&self, result: ClientResult<Applied<T>>) -> Option<T> {
        let applied = self.report(result)?;
        self.report(applied.refreshed);
        Some(applied.value)
    }

    fn report<T>(&self, result: ClientResult<T>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("{}", e);
                self.prompter.alert(&e.to_string());
                None
            }
        }
    }
}
