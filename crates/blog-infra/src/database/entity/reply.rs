//! Reply entity for SeaORM.

use sea_orm::Set;
use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "replies")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub comment_id: i64,
    #[sea_orm(column_type = "Text")]
    pub content: String,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::comment::Entity",
        from = "Column::CommentId",
        to = "super::comment::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Comment,
}

impl Related<super::comment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Comment.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for blog_core::domain::Reply {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            comment_id: model.comment_id,
            content: model.content,
            created_at: model.created_at.into(),
        }
    }
}

impl From<blog_core::domain::NewReply> for ActiveModel {
    fn from(reply: blog_core::domain::NewReply) -> Self {
        Self {
            comment_id: Set(reply.comment_id),
            content: Set(reply.content),
            created_at: Set(reply.created_at.into()),
            ..Default::default()
        }
    }
}
