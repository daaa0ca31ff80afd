//! Command handlers and wiring for the CLI.
//!
//! `App` builds the session container, credential store and API client once
//! per process. Each command resumes the stored session before it runs, and
//! a watcher task reports when the session ends while the command is in
//! flight.

use std::io::{self, Write};
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use trashvalue_core::api::services::{
    DROPOFFS_PAGE_SIZE, TRANSACTIONS_PAGE_SIZE, WASTE_BANKS_PAGE_SIZE, WASTE_TYPES_PAGE_SIZE,
};
use trashvalue_core::auth::{
    restore_session, route_for, AuthStatus, CredentialStore, KeyringCredentialStore,
    MemoryCredentialStore, RouteDecision, SessionState, SessionStore,
};
use trashvalue_core::cache::CacheManager;
use trashvalue_core::config::Config;
use trashvalue_core::models::{
    estimate_reward, parse_amount, ChatRequest, CreateDropoffRequest, CreateWasteItemRequest,
    DropoffStatus, FileUpload, LoginCredentials, PageMeta, Pager, Paginated, RegisterRequest,
    SortDirection, TopUpRequest, UpdateUserRequest, WasteBank, WasteType, WithdrawalRequest,
};
use trashvalue_core::utils::{format_date, format_rupiah, format_weight, truncate_string};
use trashvalue_core::ApiClient;

use crate::Command;

pub const SESSION_ENDED_MESSAGE: &str = "Session ended. Please log in again.";

/// Maximum width for names and descriptions in list output
const LIST_TEXT_WIDTH: usize = 40;

pub struct App {
    config: Config,
    api: ApiClient,
    cache: Option<CacheManager>,
}

impl App {
    pub fn new(config: Config, ephemeral: bool) -> Result<Self> {
        let credentials: Arc<dyn CredentialStore> = if ephemeral {
            Arc::new(MemoryCredentialStore::new())
        } else {
            Arc::new(KeyringCredentialStore::new(config.keyring_service()))
        };

        let api = ApiClient::from_config(&config, credentials, SessionStore::new())?;

        let cache = match config.cache_dir().and_then(CacheManager::new) {
            Ok(cache) => Some(cache),
            Err(e) => {
                warn!(error = %e, "Cache unavailable, continuing without it");
                None
            }
        };

        Ok(Self { config, api, cache })
    }

    fn session(&self) -> &SessionStore {
        self.api.session()
    }

    /// Resume the stored session, run one command, and report if the
    /// session ended along the way.
    pub async fn run(&mut self, command: Command) -> Result<()> {
        let status = restore_session(
            self.api.credentials().as_ref(),
            self.session(),
            self.api.clock().as_ref(),
        )
        .await;
        debug!(status = ?status, "Session restored");

        // A user-initiated logout is not reported as an ended session
        let watcher = match command {
            Command::Logout => None,
            _ => Some(SessionWatcher::spawn(self.session().subscribe())),
        };

        let result = self.dispatch(command).await;

        if let Some(watcher) = watcher {
            if watcher.finish().await {
                self.clear_cache();
            }
        }
        result
    }

    async fn dispatch(&mut self, command: Command) -> Result<()> {
        match command {
            Command::Login { email } => self.login(email).await,
            Command::Register {
                name,
                email,
                phone,
                address,
                profile_image,
                background_photo,
            } => {
                let request = RegisterRequest {
                    name,
                    phone,
                    email,
                    password: rpassword::prompt_password("Password: ")?,
                    address,
                    profile_image: read_upload(profile_image.as_deref())?,
                    background_photo: read_upload(background_photo.as_deref())?,
                };
                let response = self.api.register(&request).await?;
                println!("{}", non_empty_or(&response.message, "Account created."));
                println!("Sign in with `trashvalue login --email {}`.", request.email);
                Ok(())
            }
            Command::Logout => {
                self.api.logout().await;
                self.clear_cache();
                println!("Signed out.");
                Ok(())
            }
            Command::Status => {
                self.status();
                Ok(())
            }
            Command::Profile {
                name,
                phone,
                address,
                profile_image,
                background_photo,
            } => {
                let update = UpdateUserRequest {
                    name,
                    phone,
                    address,
                    profile_image: read_upload(profile_image.as_deref())?,
                    background_photo: read_upload(background_photo.as_deref())?,
                };
                self.profile(update).await
            }
            Command::ChangePassword => {
                self.require_session()?;
                let password = rpassword::prompt_password("New password: ")?;
                let confirm = rpassword::prompt_password("Confirm new password: ")?;
                if password.is_empty() || password != confirm {
                    anyhow::bail!("Passwords do not match");
                }
                let user_id = self.api.current_user_id().await?;
                self.api.update_password(&user_id, &password).await?;
                println!("Password updated.");
                Ok(())
            }
            Command::WasteTypes { page, refresh } => {
                let types = self.waste_types(page, refresh).await?;
                print_waste_types(&types);
                Ok(())
            }
            Command::WasteBanks { page, refresh } => {
                let banks = self.waste_banks(page, refresh).await?;
                print_waste_banks(&banks);
                Ok(())
            }
            Command::Dropoffs { page, completed } => {
                self.require_session()?;
                let status = if completed {
                    DropoffStatus::Completed
                } else {
                    DropoffStatus::Pending
                };
                let dropoffs = self.api.dropoffs(page, DROPOFFS_PAGE_SIZE, status).await?;
                if dropoffs.data.is_empty() {
                    println!("No {} dropoffs.", status.as_str().to_lowercase());
                }
                for dropoff in &dropoffs.data {
                    println!(
                        "{}  {:<12} {:>8}  {:>12}  {}",
                        dropoff.id,
                        dropoff.pickup_method.map(|m| m.as_str()).unwrap_or("-"),
                        format_weight(dropoff.total_weight),
                        format_rupiah(dropoff.total_amount),
                        dropoff.pickup_date.as_deref().map(format_date).unwrap_or_default(),
                    );
                }
                print_page_footer(&dropoffs.metadata);
                Ok(())
            }
            Command::CreateDropoff {
                address,
                date,
                method,
                notes,
            } => {
                self.require_session()?;
                let dropoff = self
                    .api
                    .create_dropoff(&CreateDropoffRequest {
                        pickup_address: address,
                        pickup_date: date,
                        pickup_method: method,
                        notes,
                    })
                    .await?;
                println!("Dropoff {} created ({}).", dropoff.id, dropoff.status);
                println!("Add items with `trashvalue add-item {} --waste-type <id> --weight <kg>`.", dropoff.id);
                Ok(())
            }
            Command::AddItem {
                dropoff_id,
                waste_type,
                weight,
                notes,
                image,
            } => {
                self.require_session()?;
                let item = self
                    .api
                    .add_waste_item(
                        &dropoff_id,
                        &CreateWasteItemRequest {
                            waste_type_id: waste_type,
                            weight,
                            notes,
                            image: read_upload(image.as_deref())?,
                        },
                    )
                    .await?;
                println!(
                    "Added {} ({}) to dropoff {}.",
                    format_weight(item.weight),
                    format_rupiah(item.amount),
                    item.dropoff_id
                );
                Ok(())
            }
            Command::Estimate {
                waste_type,
                weight,
                method,
            } => {
                let found = self.find_waste_type(&waste_type).await?;
                let reward = estimate_reward(found.price_per_kg, weight, method);
                println!(
                    "{} x {} at {}/kg ({}): {}",
                    found.name,
                    format_weight(weight),
                    format_rupiah(found.price_per_kg),
                    method,
                    format_rupiah(reward)
                );
                Ok(())
            }
            Command::Transactions { page, asc } => {
                self.require_session()?;
                let sort = if asc {
                    SortDirection::Asc
                } else {
                    SortDirection::Desc
                };
                let user_id = self.api.current_user_id().await?;
                let transactions = self
                    .api
                    .user_transactions(&user_id, page, TRANSACTIONS_PAGE_SIZE, sort)
                    .await?;
                if transactions.data.is_empty() {
                    println!("No transactions yet.");
                }
                for tx in &transactions.data {
                    println!(
                        "{:<12} {:>14}  {:<10} {}",
                        tx.created_at.as_deref().map(format_date).unwrap_or_default(),
                        format_rupiah(tx.signed_amount()),
                        format!("{:?}", tx.status),
                        tx.payment_method.map(|m| m.as_str()).unwrap_or("-"),
                    );
                }
                print_page_footer(&transactions.metadata);
                Ok(())
            }
            Command::TopUp { amount, method } => {
                self.require_session()?;
                let request = TopUpRequest::new(parse_amount(&amount), method)?;
                let response = self.api.top_up(&request).await?;
                println!(
                    "Top up of {} started. Complete the payment at:",
                    format_rupiah(request.amount as f64)
                );
                println!("{}", response.data.redirect_url);
                Ok(())
            }
            Command::Withdraw {
                amount,
                method,
                description,
            } => {
                self.require_session()?;
                let request = WithdrawalRequest::new(parse_amount(&amount), method, description)?;
                let tx = self.api.withdraw(&request).await?;
                println!(
                    "Withdrawal of {} submitted ({:?}).",
                    format_rupiah(tx.amount),
                    tx.status
                );
                Ok(())
            }
            Command::Chat { message, image } => {
                self.require_session()?;
                let response = self
                    .api
                    .send_chat(&ChatRequest {
                        message,
                        image: read_upload(image.as_deref())?,
                    })
                    .await?;
                println!("{}", response.data.response);
                Ok(())
            }
        }
    }

    // ===== Account =====

    async fn login(&mut self, email: Option<String>) -> Result<()> {
        let email = match email.or_else(|| self.config.last_email.clone()) {
            Some(email) => email,
            None => prompt("Email: ")?,
        };
        let password = rpassword::prompt_password(format!("Password for {}: ", email))?;

        let user = self
            .api
            .login(&LoginCredentials {
                email: email.clone(),
                password,
            })
            .await?;

        self.config.last_email = Some(email);
        if let Err(e) = self.config.save() {
            warn!(error = %e, "Failed to save config");
        }

        println!("Signed in as {} ({}).", non_empty_or(&user.name, &user.email), user.email);
        Ok(())
    }

    fn status(&self) {
        let state = self.session().snapshot();
        match route_for(&state) {
            RouteDecision::Home => {
                if let Some(user) = state.user {
                    println!("Signed in as {} <{}>", non_empty_or(&user.name, "-"), user.email);
                }
            }
            RouteDecision::Login => match state.user {
                Some(user) => println!(
                    "Signed in as {} with role {}; this client is for {} accounts only.",
                    user.email,
                    user.role,
                    trashvalue_core::auth::session::USER_ROLE
                ),
                None => println!("Not signed in."),
            },
            RouteDecision::Loading => println!("Checking session..."),
        }
    }

    async fn profile(&self, update: UpdateUserRequest) -> Result<()> {
        self.require_session()?;
        let user_id = self.api.current_user_id().await?;

        let user = if update.is_empty() {
            self.api.get_user(&user_id).await?
        } else {
            let user = self.api.update_user(&user_id, &update).await?;
            println!("Profile updated.");
            user
        };

        println!("{} <{}>", user.name, user.email);
        if let Some(ref phone) = user.phone {
            println!("Phone:   {}", phone);
        }
        if let Some(ref address) = user.address {
            println!("Address: {}", address);
        }
        println!("Balance: {}", format_rupiah(user.balance));
        println!("Points:  {}", user.points);
        Ok(())
    }

    fn require_session(&self) -> Result<()> {
        match self.session().snapshot().is_authenticated() {
            Some(true) => Ok(()),
            _ => anyhow::bail!("Not signed in. Run `trashvalue login` first."),
        }
    }

    // ===== Catalog =====

    async fn waste_types(&self, page: u32, refresh: bool) -> Result<Paginated<WasteType>> {
        if !refresh {
            if let Some(cached) = self.cache.as_ref().and_then(|c| c.fresh_waste_types(page)) {
                debug!(page, age = %cached.age_display(), "Using cached waste types");
                return Ok(cached.data);
            }
        }

        let types = self.api.waste_types(page, WASTE_TYPES_PAGE_SIZE).await?;
        if let Some(ref cache) = self.cache {
            if let Err(e) = cache.save_waste_types(page, &types) {
                warn!(error = %e, "Failed to cache waste types");
            }
        }
        Ok(types)
    }

    async fn waste_banks(&self, page: u32, refresh: bool) -> Result<Paginated<WasteBank>> {
        if !refresh {
            if let Some(cached) = self.cache.as_ref().and_then(|c| c.fresh_waste_banks(page)) {
                debug!(page, age = %cached.age_display(), "Using cached waste banks");
                return Ok(cached.data);
            }
        }

        let banks = self.api.waste_banks(page, WASTE_BANKS_PAGE_SIZE).await?;
        if let Some(ref cache) = self.cache {
            if let Err(e) = cache.save_waste_banks(page, &banks) {
                warn!(error = %e, "Failed to cache waste banks");
            }
        }
        Ok(banks)
    }

    /// Look a waste type up by id or name, page by page.
    async fn find_waste_type(&self, key: &str) -> Result<WasteType> {
        let mut pager = Pager::new(WASTE_TYPES_PAGE_SIZE);
        loop {
            let page = self.waste_types(pager.page, false).await?;
            if let Some(found) = page
                .data
                .into_iter()
                .find(|t| t.id == key || t.name.eq_ignore_ascii_case(key))
            {
                return Ok(found);
            }
            if !pager.next(&page.metadata) {
                anyhow::bail!("Unknown waste type: {}", key);
            }
        }
    }

    fn clear_cache(&self) {
        if let Some(ref cache) = self.cache {
            if let Err(e) = cache.clear() {
                warn!(error = %e, "Failed to clear cache");
            }
        }
    }
}

// ===== Session watcher =====

/// Background task that reports the end of a session.
struct SessionWatcher {
    shutdown: oneshot::Sender<()>,
    handle: JoinHandle<bool>,
}

impl SessionWatcher {
    fn spawn(mut rx: watch::Receiver<SessionState>) -> Self {
        // Read the starting status now; later changes arrive through `rx`
        let was_authenticated = rx.borrow_and_update().status == AuthStatus::Authenticated;
        let (shutdown, shutdown_rx) = oneshot::channel();
        let handle = tokio::spawn(watch_session(rx, shutdown_rx, was_authenticated));
        Self { shutdown, handle }
    }

    /// Stop watching. Returns whether the session ended while watched.
    async fn finish(self) -> bool {
        let _ = self.shutdown.send(());
        match self.handle.await {
            Ok(ended) => ended,
            Err(e) => {
                warn!(error = %e, "Session watcher failed");
                false
            }
        }
    }
}

async fn watch_session(
    mut rx: watch::Receiver<SessionState>,
    mut shutdown: oneshot::Receiver<()>,
    mut was_authenticated: bool,
) -> bool {
    let mut ended = false;

    loop {
        // Pending changes are drained before shutdown is honoured
        let done = tokio::select! {
            biased;
            changed = rx.changed() => changed.is_err(),
            _ = &mut shutdown => true,
        };

        let status = rx.borrow_and_update().status;
        if was_authenticated && status == AuthStatus::Unauthenticated {
            eprintln!("{}", SESSION_ENDED_MESSAGE);
            ended = true;
        }
        was_authenticated = status == AuthStatus::Authenticated;

        if done {
            return ended;
        }
    }
}

// ===== Output helpers =====

fn print_waste_types(page: &Paginated<WasteType>) {
    if page.data.is_empty() {
        println!("No waste types.");
    }
    for waste_type in &page.data {
        println!(
            "{:<24} {:>12}/kg  {}",
            truncate_string(&waste_type.name, 24),
            format_rupiah(waste_type.price_per_kg),
            waste_type.id
        );
        if let Some(ref description) = waste_type.description {
            println!("    {}", truncate_string(description, LIST_TEXT_WIDTH));
        }
    }
    print_page_footer(&page.metadata);
}

fn print_waste_banks(page: &Paginated<WasteBank>) {
    if page.data.is_empty() {
        println!("No waste banks.");
    }
    for bank in &page.data {
        println!(
            "{:<24} {:>5} dropoffs  {}",
            truncate_string(&bank.name, 24),
            bank.dropoff_count(),
            bank.address
                .as_deref()
                .map(|a| truncate_string(a, LIST_TEXT_WIDTH))
                .unwrap_or_default()
        );
    }
    print_page_footer(&page.metadata);
}

fn print_page_footer(meta: &PageMeta) {
    if meta.total_pages > 1 {
        let mut footer = format!("Page {} of {}", meta.current_page, meta.total_pages);
        if meta.has_next() {
            footer.push_str(&format!(" (next: --page {})", meta.current_page + 1));
        }
        println!("{}", footer);
    }
}

fn non_empty_or<'a>(value: &'a str, fallback: &'a str) -> &'a str {
    if value.is_empty() {
        fallback
    } else {
        value
    }
}

fn read_upload(path: Option<&Path>) -> Result<Option<FileUpload>> {
    path.map(|p| {
        FileUpload::from_path(p).with_context(|| format!("Failed to read image: {}", p.display()))
    })
    .transpose()
}

fn prompt(label: &str) -> Result<String> {
    print!("{}", label);
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use trashvalue_core::auth::UserSummary;

    fn user() -> UserSummary {
        UserSummary {
            id: "user-1".to_string(),
            name: "Siti Rahma".to_string(),
            email: "siti@example.com".to_string(),
            role: "USER".to_string(),
        }
    }

    #[tokio::test]
    async fn test_watcher_reports_session_end() {
        let session = SessionStore::new();
        session.set_authenticated(user());
        let watcher = SessionWatcher::spawn(session.subscribe());

        session.logout();

        assert!(watcher.finish().await);
    }

    #[tokio::test]
    async fn test_watcher_ignores_unchanged_session() {
        let session = SessionStore::new();
        session.set_authenticated(user());
        let watcher = SessionWatcher::spawn(session.subscribe());

        session.set_loading(true);
        session.set_loading(false);

        assert!(!watcher.finish().await);
    }

    #[tokio::test]
    async fn test_watcher_ignores_already_signed_out() {
        let session = SessionStore::new();
        session.logout();
        let watcher = SessionWatcher::spawn(session.subscribe());

        session.logout();

        assert!(!watcher.finish().await);
    }

    #[test]
    fn test_read_upload_missing_file() {
        assert!(read_upload(None).unwrap().is_none());
        assert!(read_upload(Some(Path::new("/nonexistent/photo.jpg"))).is_err());
    }

    #[test]
    fn test_non_empty_or() {
        assert_eq!(non_empty_or("", "fallback"), "fallback");
        assert_eq!(non_empty_or("Siti", "fallback"), "Siti");
    }
}
