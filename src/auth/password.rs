use crate::error::{AppError, AppResult};

/// Hash a password with bcrypt on the blocking pool.
pub async fn hash(password: String, cost: u32) -> AppResult<String> {
    tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
        .await
        .map_err(|e| AppError::Internal(format!("hash task failed: {}", e)))?
        .map_err(AppError::from)
}

/// Compare a password against a stored bcrypt hash on the blocking pool.
pub async fn verify(password: String, stored_hash: String) -> AppResult<bool> {
    tokio::task::spawn_blocking(move || bcrypt::verify(password, &stored_hash))
        .await
        .map_err(|e| AppError::Internal(format!("verify task failed: {}", e)))?
        .map_err(AppError::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn hash_then_verify() {
        let hashed = hash("pw1".to_string(), 4).await.unwrap();
        assert_ne!(hashed, "pw1");
        assert!(verify("pw1".to_string(), hashed.clone()).await.unwrap());
        assert!(!verify("pw2".to_string(), hashed).await.unwrap());
    }

    #[tokio::test]
    async fn hash_embeds_cost() {
        let hashed = hash("pw1".to_string(), 10).await.unwrap();
        assert!(hashed.starts_with("$2b$10$"), "unexpected hash {}", hashed);
    }

    #[tokio::test]
    async fn verify_rejects_malformed_hash() {
        assert!(verify("pw1".to_string(), "not-a-hash".to_string())
            .await
            .is_err());
    }
}
