//! Business logic services
//!
//! Guarded commands open one unit-of-work transaction each; queries read
//! through a unit of work without opening one.

pub mod auth;
pub mod chat;
pub mod context;
pub mod error;
pub mod group;
pub mod maintenance;
pub mod message;
pub mod user;

mod guards;
mod render;
mod transaction;

#[cfg(test)]
pub(crate) mod testing;

pub use auth::AuthService;
pub use chat::ChatService;
pub use context::{ServiceContext, ServiceContextBuilder, DEFAULT_REFRESH_TOKEN_TTL};
pub use error::{ServiceError, ServiceResult};
pub use group::GroupService;
pub use maintenance::MaintenanceService;
pub use message::MessageService;
pub use user::UserService;

#[cfg(test)]
mod tests {
    use chat_core::{DomainError, Snowflake};

    use super::testing::Harness;
    use super::*;
    use crate::dto::{
        CompleteAccountRequest, CreateGroupRequest, MakePublicGroupRequest, SendMessageRequest,
        UpdateShortnameRequest,
    };

    #[derive(Debug, Clone, Copy)]
    enum Command {
        CreateGroup,
        DeleteGroup,
        MakePublic,
        MakePrivate,
        UpdateShortname,
        CompleteAccount,
        Join,
        Leave,
        SendMessage,
    }

    async fn run(ctx: &ServiceContext, command: Command, actor: Snowflake, group: Snowflake) -> ServiceResult<()> {
        let groups = GroupService::new(ctx);
        match command {
            Command::CreateGroup => groups
                .create_group(
                    actor,
                    CreateGroupRequest {
                        name: "Rustaceans".to_string(),
                        description: None,
                        is_private: true,
                        shortname: None,
                    },
                )
                .await
                .map(drop),
            Command::DeleteGroup => groups.delete_group(actor, group).await,
            Command::MakePublic => groups
                .make_public(
                    actor,
                    group,
                    MakePublicGroupRequest {
                        shortname: "team".to_string(),
                    },
                )
                .await
                .map(drop),
            Command::MakePrivate => groups.make_private(actor, group).await.map(drop),
            Command::UpdateShortname => UserService::new(ctx)
                .update_shortname(
                    actor,
                    UpdateShortnameRequest {
                        shortname: "renamed".to_string(),
                    },
                )
                .await
                .map(drop),
            Command::CompleteAccount => UserService::new(ctx)
                .complete_account(
                    actor,
                    CompleteAccountRequest {
                        shortname: "newcomer".to_string(),
                        display_name: None,
                    },
                )
                .await
                .map(drop),
            Command::Join => groups.join(actor, group).await.map(drop),
            Command::Leave => groups.leave(actor, group).await,
            Command::SendMessage => MessageService::new(ctx)
                .send_message(
                    actor,
                    SendMessageRequest {
                        chat_id: group,
                        content: "hello".to_string(),
                    },
                )
                .await
                .map(drop),
        }
    }

    #[tokio::test]
    async fn test_missing_actor_stops_every_guarded_command() {
        let h = Harness::new();
        let ada = h.seed_verified("ada_l").await;
        let group = h.seed_group(&ada, None).await;
        let missing = Snowflake::new(404);

        for command in [
            Command::CreateGroup,
            Command::DeleteGroup,
            Command::MakePublic,
            Command::MakePrivate,
            Command::UpdateShortname,
            Command::CompleteAccount,
            Command::Join,
            Command::Leave,
            Command::SendMessage,
        ] {
            h.store.clear_calls();
            let err = run(&h.ctx, command, missing, group.id).await.unwrap_err();

            assert!(
                matches!(err, ServiceError::Domain(DomainError::UserNotFound(id)) if id == missing),
                "{command:?}: {err:?}"
            );
            assert_eq!(err.status_code(), 404, "{command:?}");
            assert_eq!(
                h.store.calls(),
                vec!["uow.begin", "users.find_by_id", "uow.rollback"],
                "{command:?}"
            );
        }
    }
}
