use uuid::Uuid;

use crate::storage::StoreError;
use crate::storage::models::Link;
use migration::entities::link;

/// 将 Sea-ORM Model 转换为 Link
pub fn model_to_link(model: link::Model) -> Result<Link, StoreError> {
    let id = Uuid::parse_str(&model.id).map_err(|e| {
        StoreError::Corrupt(format!("link '{}' has invalid id: {}", model.short, e))
    })?;

    Ok(Link {
        id,
        created_at: model.created_at,
        expire_at: model.expire_at,
        url: model.url,
        short: model.short,
        password_hash: model.password_hash,
    })
}

/// 将 Link 转换为 ActiveModel（仅用于插入，链接创建后不可修改）
pub fn link_to_active_model(link: &Link) -> link::ActiveModel {
    use sea_orm::ActiveValue::Set;

    link::ActiveModel {
        id: Set(link.id.to_string()),
        short: Set(link.short.clone()),
        url: Set(link.url.clone()),
        created_at: Set(link.created_at),
        expire_at: Set(link.expire_at),
        password_hash: Set(link.password_hash.clone()),
    }
}
