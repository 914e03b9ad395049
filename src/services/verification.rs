use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;

use crate::config::SmsConfig;
use crate::database::manager::DatabaseError;
use crate::database::models::{MemberDirectory, PhoneVerification};
use crate::database::store::{AccountDirectory, VerificationStore};
use crate::sms::{SmsError, SmsGateway};

pub const MIN_PHONE_DIGITS: usize = 10;

#[derive(Debug, Error)]
pub enum VerificationError {
    #[error("invalid phone number")]
    InvalidPhone,

    #[error("account_exists")]
    AccountExists {
        masked_email: Option<String>,
        full_name: Option<String>,
    },

    #[error("verification not found")]
    NotFound,

    #[error("verification code expired")]
    Expired,

    #[error("invalid verification code")]
    CodeMismatch,

    #[error(transparent)]
    Database(#[from] DatabaseError),

    #[error(transparent)]
    Sms(#[from] SmsError),
}

/// Hyphens and whitespace removed
pub fn normalize_phone(phone: &str) -> String {
    phone
        .chars()
        .filter(|c| *c != '-' && !c.is_whitespace())
        .collect()
}

pub fn validate_phone(phone: &str) -> Result<String, VerificationError> {
    let normalized = normalize_phone(phone);
    if normalized.len() < MIN_PHONE_DIGITS || !normalized.chars().all(|c| c.is_ascii_digit()) {
        return Err(VerificationError::InvalidPhone);
    }
    Ok(normalized)
}

#[derive(Debug, Clone, Serialize)]
pub struct IssuedCode {
    pub phone: String,
    pub expires_at: DateTime<Utc>,
}

/// Issues and redeems SMS codes
pub struct VerificationService {
    store: Arc<dyn VerificationStore>,
    directory: Arc<dyn AccountDirectory>,
    sms: Arc<dyn SmsGateway>,
    settings: SmsConfig,
}

impl VerificationService {
    pub fn new(
        store: Arc<dyn VerificationStore>,
        directory: Arc<dyn AccountDirectory>,
        sms: Arc<dyn SmsGateway>,
        settings: SmsConfig,
    ) -> Self {
        Self { store, directory, sms, settings }
    }

    fn generate_code(&self, phone: &str) -> String {
        if phone == normalize_phone(&self.settings.test_phone) {
            return self.settings.test_code.clone();
        }
        let code: u32 = rand::thread_rng().gen_range(100_000..1_000_000);
        code.to_string()
    }

    pub async fn issue_code(&self, phone: &str) -> Result<IssuedCode, VerificationError> {
        self.issue_code_at(phone, Utc::now()).await
    }

    /// Nothing is written when the phone already belongs to an account
    pub async fn issue_code_at(
        &self,
        phone: &str,
        now: DateTime<Utc>,
    ) -> Result<IssuedCode, VerificationError> {
        let phone = validate_phone(phone)?;

        let duplicate = self.directory.check_phone_duplicate(&phone).await?;
        if duplicate.exists {
            tracing::info!("Code request for {} refused: account exists", phone);
            return Err(VerificationError::AccountExists {
                masked_email: duplicate.masked_email,
                full_name: duplicate.full_name,
            });
        }

        let code = self.generate_code(&phone);
        let expires_at = now + Duration::seconds(self.settings.code_ttl_secs);
        self.store
            .upsert_verification(PhoneVerification {
                phone: phone.clone(),
                code: code.clone(),
                expires_at,
                is_verified: false,
            })
            .await?;

        self.sms.send_code(&phone, &code).await?;
        tracing::info!("Issued verification code for {} (expires {})", phone, expires_at);

        Ok(IssuedCode { phone, expires_at })
    }

    pub async fn verify(
        &self,
        phone: &str,
        code: &str,
        full_name: Option<&str>,
    ) -> Result<Option<MemberDirectory>, VerificationError> {
        self.verify_at(phone, code, full_name, Utc::now()).await
    }

    /// A code redeems once: the row is deleted on success. Expiry is checked
    /// before the code, and an expired row never matches a member.
    pub async fn verify_at(
        &self,
        phone: &str,
        code: &str,
        full_name: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<Option<MemberDirectory>, VerificationError> {
        let phone = normalize_phone(phone);

        let record = self
            .store
            .find_verification(&phone)
            .await?
            .ok_or(VerificationError::NotFound)?;

        if record.is_expired(now) {
            return Err(VerificationError::Expired);
        }
        if record.code != code.trim() {
            return Err(VerificationError::CodeMismatch);
        }

        // A concurrent request may have redeemed it between find and delete
        if !self.store.delete_verification(&phone).await? {
            return Err(VerificationError::NotFound);
        }

        let members = self.directory.members_by_phone(&phone).await?;
        let wanted = full_name.map(str::trim).filter(|n| !n.is_empty());
        let matched = match wanted {
            Some(name) => members.into_iter().find(|m| m.full_name.trim() == name),
            None => members.into_iter().next(),
        };

        tracing::info!(
            "Verified {} (member match: {})",
            phone,
            matched.as_ref().map(|m| m.id.to_string()).unwrap_or_else(|| "none".into())
        );
        Ok(matched)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::database::store::DuplicateCheck;
    use crate::database::MemoryStore;
    use crate::sms::LoggingGateway;

    fn service(store: &Arc<MemoryStore>) -> VerificationService {
        VerificationService::new(
            store.clone(),
            store.clone(),
            Arc::new(LoggingGateway),
            AppConfig::development().sms,
        )
    }

    #[test]
    fn phones_need_ten_digits_after_stripping_hyphens() {
        assert_eq!(validate_phone("010-1234-5678").unwrap(), "01012345678");
        assert_eq!(validate_phone("02 123 4567").unwrap_err().to_string(), "invalid phone number");
        assert!(validate_phone("010-123-456").is_err());
        assert!(validate_phone("+8210123456").is_err());
    }

    #[tokio::test]
    async fn test_phone_always_gets_fixed_code() {
        let store = Arc::new(MemoryStore::new());
        let svc = service(&store);
        for _ in 0..3 {
            svc.issue_code("010-0000-0000").await.unwrap();
            assert_eq!(store.verification("01000000000").await.unwrap().code, "123456");
        }
    }

    #[tokio::test]
    async fn other_phones_get_six_digit_codes() {
        let store = Arc::new(MemoryStore::new());
        let svc = service(&store);
        let now = Utc::now();
        let issued = svc.issue_code_at("01012345678", now).await.unwrap();
        let row = store.verification("01012345678").await.unwrap();
        assert_eq!(row.code.len(), 6);
        assert!(row.code.chars().all(|c| c.is_ascii_digit()));
        assert_eq!(issued.expires_at, now + Duration::minutes(3));
        assert!(!row.is_verified);
    }

    #[tokio::test]
    async fn duplicate_account_blocks_issuance() {
        let store = Arc::new(MemoryStore::new());
        store
            .register_account_phone(
                "010-5555-5555",
                DuplicateCheck {
                    exists: true,
                    masked_email: Some("ho***@example.com".into()),
                    full_name: Some("홍길동".into()),
                },
            )
            .await;

        let err = service(&store).issue_code("010-5555-5555").await.unwrap_err();
        match err {
            VerificationError::AccountExists { masked_email, full_name } => {
                assert_eq!(masked_email.as_deref(), Some("ho***@example.com"));
                assert_eq!(full_name.as_deref(), Some("홍길동"));
            }
            other => panic!("unexpected: {:?}", other),
        }
        assert_eq!(store.verification_count().await, 0);
    }

    #[tokio::test]
    async fn correct_code_verifies_exactly_once() {
        let store = Arc::new(MemoryStore::new());
        let mut member = MemberDirectory::new("김영희");
        member.phone = Some("010-0000-0000".into());
        store.insert_member(member.clone()).await;
        let svc = service(&store);

        svc.issue_code("01000000000").await.unwrap();
        let matched = svc.verify("010-0000-0000", "123456", None).await.unwrap();
        assert_eq!(matched.map(|m| m.id), Some(member.id));

        let again = svc.verify("01000000000", "123456", None).await.unwrap_err();
        assert!(matches!(again, VerificationError::NotFound));
    }

    #[tokio::test]
    async fn wrong_code_keeps_the_row() {
        let store = Arc::new(MemoryStore::new());
        let svc = service(&store);
        svc.issue_code("01000000000").await.unwrap();

        let err = svc.verify("01000000000", "654321", None).await.unwrap_err();
        assert!(matches!(err, VerificationError::CodeMismatch));
        assert!(svc.verify("01000000000", "123456", None).await.is_ok());
    }

    #[tokio::test]
    async fn expired_rows_fail_regardless_of_code() {
        let store = Arc::new(MemoryStore::new());
        let mut member = MemberDirectory::new("김영희");
        member.phone = Some("01000000000".into());
        store.insert_member(member).await;
        let svc = service(&store);

        let issued_at = Utc::now() - Duration::minutes(10);
        svc.issue_code_at("01000000000", issued_at).await.unwrap();

        for code in ["123456", "000000"] {
            let err = svc.verify("01000000000", code, None).await.unwrap_err();
            assert!(matches!(err, VerificationError::Expired));
        }
        // Boundary: expiry instant itself is already expired
        let expires_at = issued_at + Duration::minutes(3);
        let err = svc.verify_at("01000000000", "123456", None, expires_at).await.unwrap_err();
        assert!(matches!(err, VerificationError::Expired));
    }

    #[tokio::test]
    async fn full_name_narrows_member_match() {
        let store = Arc::new(MemoryStore::new());
        for name in ["김영희", "박철수"] {
            let mut m = MemberDirectory::new(name);
            m.phone = Some("010-0000-0000".into());
            store.insert_member(m).await;
        }
        let svc = service(&store);

        svc.issue_code("01000000000").await.unwrap();
        let matched = svc.verify("01000000000", "123456", Some(" 박철수 ")).await.unwrap();
        assert_eq!(matched.unwrap().full_name, "박철수");

        svc.issue_code("01000000000").await.unwrap();
        let none = svc.verify("01000000000", "123456", Some("이순신")).await.unwrap();
        assert!(none.is_none());
    }
}
