//! 密码哈希工具模块
//!
//! Argon2id (v0x13), 64 MiB, 1 iteration, parallelism 2, 16-byte salt,
//! 32-byte output, PHC string encoding.

use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{
        self, PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng,
    },
};

pub const MEMORY_COST_KIB: u32 = 64 * 1024;
pub const TIME_COST: u32 = 1;
pub const PARALLELISM: u32 = 2;
pub const OUTPUT_LEN: usize = 32;

/// 密码哈希错误
#[derive(Debug)]
pub enum PasswordError {
    HashError(String),
    /// 存储的哈希无法解析（数据损坏，属于服务端错误）
    CorruptHash(String),
}

impl std::fmt::Display for PasswordError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::HashError(msg) => write!(f, "Password hash error: {}", msg),
            Self::CorruptHash(msg) => write!(f, "Stored password hash is corrupt: {}", msg),
        }
    }
}

impl std::error::Error for PasswordError {}

fn hasher() -> Result<Argon2<'static>, PasswordError> {
    let params = Params::new(MEMORY_COST_KIB, TIME_COST, PARALLELISM, Some(OUTPUT_LEN))
        .map_err(|e| PasswordError::HashError(e.to_string()))?;
    Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
}

/// 对密码进行 Argon2id 哈希
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);

    hasher()?
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| PasswordError::HashError(e.to_string()))
}

/// 验证密码是否匹配哈希
///
/// 不匹配返回 `Ok(false)`；哈希本身无法解析或计算失败返回 `Err`
pub fn verify_password(password: &str, hash: &str) -> Result<bool, PasswordError> {
    let parsed_hash =
        PasswordHash::new(hash).map_err(|e| PasswordError::CorruptHash(e.to_string()))?;

    // 参数取自哈希串本身
    match Argon2::default().verify_password(password.as_bytes(), &parsed_hash) {
        Ok(()) => Ok(true),
        Err(password_hash::Error::Password) => Ok(false),
        Err(e) => Err(PasswordError::CorruptHash(e.to_string())),
    }
}

/// 处理创建时的密码：空密码表示不保护，返回空字符串
pub fn process_new_password(password: Option<&str>) -> Result<String, PasswordError> {
    match password {
        Some(pwd) if !pwd.is_empty() => hash_password(pwd),
        _ => Ok(String::new()),
    }
}

/// 在阻塞线程池中哈希，避免占用异步 worker
pub async fn hash_password_blocking(password: Option<String>) -> Result<String, PasswordError> {
    tokio::task::spawn_blocking(move || process_new_password(password.as_deref()))
        .await
        .map_err(|e| PasswordError::HashError(format!("hashing task failed: {}", e)))?
}

pub async fn verify_password_blocking(
    password: String,
    hash: String,
) -> Result<bool, PasswordError> {
    tokio::task::spawn_blocking(move || verify_password(&password, &hash))
        .await
        .map_err(|e| PasswordError::HashError(format!("verification task failed: {}", e)))?
}
