//! # Account Directory
//!
//! In-memory adapter for [`AccountsPort`]. Holds the configured accounts,
//! the per-account device roster, this device's identity key and the
//! short-lived verification state (sign-up codes, close codes, pending
//! device verifications).
//!
//! The directory has no mail transport: codes a real deployment would send
//! by email stay readable through [`AccountDirectory::issued_signup_code`]
//! and [`AccountDirectory::issued_close_code`], and device verification is
//! approved through [`AccountDirectory::approve_verification`]. Hosts
//! embedding the in-memory adapter drive those seams themselves.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;
use tokio::sync::watch;
use tracing::debug;
use uuid::Uuid;

use shared_types::{Account, AccountKind, Device, DomainError, RemoteAccount};

use crate::observable::ObservableCell;
use crate::ports::AccountsPort;

/// Identifier of the always-present device-local account.
pub const LOCAL_ACCOUNT_ID: i32 = 1;

/// In-memory account, device and verification state.
pub struct AccountDirectory {
    state: RwLock<DirectoryState>,
    snapshot: ObservableCell<Vec<Account>>,
    identity_pubkey: String,
}

struct DirectoryState {
    accounts: Vec<Account>,
    devices: Vec<Device>,
    next_account_id: i32,
    next_device_id: i32,
    /// email -> mailed sign-up code
    signup_codes: HashMap<String, String>,
    /// account id -> mailed close code
    close_codes: HashMap<i32, String>,
    /// token -> approval flag for pending device verifications
    verifications: HashMap<String, watch::Sender<bool>>,
}

impl AccountDirectory {
    /// Create a directory seeded with the device-local account.
    #[must_use]
    pub fn new() -> Self {
        let local = Account {
            id: LOCAL_ACCOUNT_ID,
            name: "On this device".to_string(),
            kind: AccountKind::Local,
            email: None,
        };

        Self {
            snapshot: ObservableCell::new(vec![local.clone()]),
            state: RwLock::new(DirectoryState {
                accounts: vec![local],
                devices: Vec::new(),
                next_account_id: LOCAL_ACCOUNT_ID + 1,
                next_device_id: 1,
                signup_codes: HashMap::new(),
                close_codes: HashMap::new(),
                verifications: HashMap::new(),
            }),
            identity_pubkey: mint_key(),
        }
    }

    /// The sign-up code most recently issued for `email`, if any. Stands in
    /// for the mailbox a real deployment delivers it to.
    #[must_use]
    pub fn issued_signup_code(&self, email: &str) -> Option<String> {
        self.state.read().signup_codes.get(email).cloned()
    }

    /// The close code most recently issued for an account, if any.
    #[must_use]
    pub fn issued_close_code(&self, account_id: i32) -> Option<String> {
        self.state.read().close_codes.get(&account_id).cloned()
    }

    /// Approve a pending device verification. Waiters resolve; the token
    /// stays approved for late arrivals. Unknown tokens report failure.
    pub fn approve_verification(&self, token: &str) -> Result<(), DomainError> {
        let state = self.state.read();
        let Some(sender) = state.verifications.get(token) else {
            return Err(DomainError::UnknownVerificationToken);
        };

        sender.send_replace(true);
        debug!(token, "device verification approved");
        Ok(())
    }

    fn publish(&self, state: &DirectoryState) {
        self.snapshot.publish(state.accounts.clone());
    }

    fn attach_account(
        &self,
        state: &mut DirectoryState,
        email: String,
    ) -> Result<Account, DomainError> {
        if state.accounts.iter().any(|a| a.email.as_deref() == Some(email.as_str())) {
            return Err(DomainError::EmailAlreadyUsed(email));
        }

        let id = state.next_account_id;
        state.next_account_id += 1;

        let name = email.split('@').next().unwrap_or(&email).to_string();
        let account = Account {
            id,
            name,
            kind: AccountKind::Remote,
            email: Some(email),
        };
        state.accounts.push(account.clone());

        debug!(account_id = id, "account attached");
        Ok(account)
    }

    fn detach_account(
        &self,
        state: &mut DirectoryState,
        account_id: i32,
    ) -> Result<(), DomainError> {
        let index = state
            .accounts
            .iter()
            .position(|a| a.id == account_id)
            .ok_or(DomainError::AccountNotFound(account_id))?;

        state.accounts.remove(index);
        state.devices.retain(|d| d.account_id != account_id);
        state.close_codes.remove(&account_id);

        debug!(account_id, "account detached");
        Ok(())
    }
}

impl Default for AccountDirectory {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AccountsPort for AccountDirectory {
    fn watch_accounts(&self) -> watch::Receiver<Vec<Account>> {
        self.snapshot.subscribe()
    }

    async fn account(&self, account_id: i32) -> Result<Account, DomainError> {
        self.state
            .read()
            .accounts
            .iter()
            .find(|a| a.id == account_id)
            .cloned()
            .ok_or(DomainError::AccountNotFound(account_id))
    }

    async fn remote_account(&self, account_id: i32) -> Result<RemoteAccount, DomainError> {
        let account = self.account(account_id).await?;

        match (account.kind, account.email) {
            (AccountKind::Remote, Some(email)) => Ok(RemoteAccount {
                email,
                verified: true,
            }),
            _ => Err(DomainError::AccountNotRemote(account_id)),
        }
    }

    async fn devices(&self, account_id: i32) -> Result<Vec<Device>, DomainError> {
        self.account(account_id).await?;

        Ok(self
            .state
            .read()
            .devices
            .iter()
            .filter(|d| d.account_id == account_id)
            .cloned()
            .collect())
    }

    async fn add_device(
        &self,
        account_id: i32,
        fingerprint: String,
    ) -> Result<Device, DomainError> {
        self.account(account_id).await?;

        let mut state = self.state.write();
        let id = state.next_device_id;
        state.next_device_id += 1;

        let device = Device {
            id,
            account_id,
            fingerprint,
            pubkey: mint_key(),
        };
        state.devices.push(device.clone());

        debug!(device_id = id, account_id, "device enrolled");
        Ok(device)
    }

    async fn remove_device(&self, device_id: i32) -> Result<(), DomainError> {
        let mut state = self.state.write();
        let before = state.devices.len();
        state.devices.retain(|d| d.id != device_id);

        if state.devices.len() == before {
            return Err(DomainError::DeviceNotFound(device_id));
        }
        Ok(())
    }

    async fn add_account(&self, email: String) -> Result<Account, DomainError> {
        let mut state = self.state.write();
        let account = self.attach_account(&mut state, email)?;
        self.publish(&state);
        Ok(account)
    }

    async fn remove_account(&self, account_id: i32) -> Result<(), DomainError> {
        let mut state = self.state.write();
        self.detach_account(&mut state, account_id)?;
        self.publish(&state);
        Ok(())
    }

    async fn public_key(&self) -> Result<String, DomainError> {
        Ok(self.identity_pubkey.clone())
    }

    async fn send_verification_code(&self, email: String) -> Result<(), DomainError> {
        let mut state = self.state.write();
        if state.accounts.iter().any(|a| a.email.as_deref() == Some(email.as_str())) {
            return Err(DomainError::EmailAlreadyUsed(email));
        }

        let code = mint_code();
        debug!(%email, "sign-up code issued");
        state.signup_codes.insert(email, code);
        Ok(())
    }

    async fn sign_up(&self, email: String, code: String) -> Result<Account, DomainError> {
        let mut state = self.state.write();

        match state.signup_codes.get(&email) {
            Some(expected) if *expected == code => {}
            _ => return Err(DomainError::InvalidCode),
        }
        state.signup_codes.remove(&email);

        let account = self.attach_account(&mut state, email)?;
        self.publish(&state);
        Ok(account)
    }

    async fn request_verification(&self, email: String) -> Result<String, DomainError> {
        let mut state = self.state.write();
        if !state.accounts.iter().any(|a| a.email.as_deref() == Some(email.as_str())) {
            return Err(DomainError::EmailNotFound(email));
        }

        let token = Uuid::new_v4().simple().to_string();
        let (sender, _) = watch::channel(false);
        state.verifications.insert(token.clone(), sender);

        debug!(%email, %token, "device verification requested");
        Ok(token)
    }

    async fn wait_verification(&self, token: String) -> Result<(), DomainError> {
        let mut receiver = {
            let state = self.state.read();
            let sender = state
                .verifications
                .get(&token)
                .ok_or(DomainError::UnknownVerificationToken)?;
            sender.subscribe()
        };

        loop {
            if *receiver.borrow() {
                return Ok(());
            }

            receiver
                .changed()
                .await
                .map_err(|_| DomainError::UnknownVerificationToken)?;
        }
    }

    async fn send_close_code(&self, account_id: i32) -> Result<(), DomainError> {
        let account = self.account(account_id).await?;
        if account.kind != AccountKind::Remote {
            return Err(DomainError::AccountNotRemote(account_id));
        }

        let code = mint_code();
        debug!(account_id, "close code issued");
        self.state.write().close_codes.insert(account_id, code);
        Ok(())
    }

    async fn close_account(&self, account_id: i32, code: String) -> Result<(), DomainError> {
        let mut state = self.state.write();

        match state.close_codes.get(&account_id) {
            Some(expected) if *expected == code => {}
            _ => return Err(DomainError::InvalidCode),
        }

        self.detach_account(&mut state, account_id)?;
        self.publish(&state);
        Ok(())
    }
}

fn mint_key() -> String {
    format!("qpk_{}", Uuid::new_v4().simple())
}

fn mint_code() -> String {
    let raw = Uuid::new_v4().simple().to_string();
    raw.chars().take(6).collect()
}
