//! User entity for SeaORM.

use sea_orm::Set;
use sea_orm::entity::prelude::*;

use serif_core::domain::User;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub email: String,
    pub password_hash: String,
    pub first_name: Option<String>,
    pub email_verified_at: Option<DateTimeWithTimeZone>,
    pub confirmation_token: Option<String>,
    pub confirmation_sent_at: Option<DateTimeWithTimeZone>,
    pub recovery_token: Option<String>,
    pub recovery_sent_at: Option<DateTimeWithTimeZone>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Conversion from SeaORM Model to Domain User.
impl From<Model> for User {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            email: model.email,
            password_hash: model.password_hash,
            first_name: model.first_name,
            email_verified_at: model.email_verified_at.map(Into::into),
            confirmation_token: model.confirmation_token,
            confirmation_sent_at: model.confirmation_sent_at.map(Into::into),
            recovery_token: model.recovery_token,
            recovery_sent_at: model.recovery_sent_at.map(Into::into),
            created_at: model.created_at.into(),
            updated_at: model.updated_at.into(),
        }
    }
}

/// Conversion from Domain User to SeaORM ActiveModel.
impl From<User> for ActiveModel {
    fn from(user: User) -> Self {
        Self {
            id: Set(user.id),
            email: Set(user.email),
            password_hash: Set(user.password_hash),
            first_name: Set(user.first_name),
            email_verified_at: Set(user.email_verified_at.map(Into::into)),
            confirmation_token: Set(user.confirmation_token),
            confirmation_sent_at: Set(user.confirmation_sent_at.map(Into::into)),
            recovery_token: Set(user.recovery_token),
            recovery_sent_at: Set(user.recovery_sent_at.map(Into::into)),
            created_at: Set(user.created_at.into()),
            updated_at: Set(user.updated_at.into()),
        }
    }
}
