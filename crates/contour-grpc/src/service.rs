//! gRPC service implementation
//!
//! Implements the UserService trait generated from proto definitions. Every
//! call goes through the baseline user projection, the same path the REST
//! adapter takes.

use std::sync::{Arc, Mutex};

use contour_domain::access;
use contour_domain::model::baseline;
use contour_domain::traits::RowStore;
use contour_domain::{ContractError, Entity, EntityProjection, Revision};
use tonic::{Request, Response, Status};

use crate::conversions::{create_request_to_body, user_to_proto};
use crate::proto::user_service_server::UserService;
use crate::proto::*;

/// Map a domain failure onto a gRPC status
pub fn status_from(err: ContractError) -> Status {
    match err {
        ContractError::Validation(e) => Status::invalid_argument(e.to_string()),
        e @ ContractError::NotFound { .. } => Status::not_found(e.to_string()),
        e @ ContractError::Storage(_) => Status::internal(e.to_string()),
    }
}

/// Implementation of the UserService
pub struct UserServiceImpl<S: RowStore> {
    store: Arc<Mutex<S>>,
}

impl<S: RowStore> UserServiceImpl<S> {
    /// Create a new service instance
    pub fn new(store: Arc<Mutex<S>>) -> Self {
        Self { store }
    }

    fn projection() -> &'static EntityProjection {
        Revision::Baseline.projection(Entity::User)
    }
}

#[tonic::async_trait]
impl<S> UserService for UserServiceImpl<S>
where
    S: RowStore + Send + 'static,
{
    async fn get_user(&self, request: Request<GetUserRequest>) -> Result<Response<User>, Status> {
        let id = request.into_inner().id;
        tracing::debug!(id, "GetUser");

        let store = access::lock(&self.store).map_err(status_from)?;
        let user: baseline::User =
            access::fetch_as(&*store, Self::projection(), id).map_err(status_from)?;

        Ok(Response::new(user_to_proto(user)))
    }

    async fn create_user(
        &self,
        request: Request<CreateUserRequest>,
    ) -> Result<Response<User>, Status> {
        let body = create_request_to_body(request.into_inner())
            .map_err(|e| Status::invalid_argument(e.to_string()))?;

        let mut store = access::lock(&self.store).map_err(status_from)?;
        let id = access::create(&mut *store, Self::projection(), &body).map_err(status_from)?;
        let user: baseline::User =
            access::fetch_as(&*store, Self::projection(), id).map_err(status_from)?;

        tracing::info!(id, "User created over gRPC");
        Ok(Response::new(user_to_proto(user)))
    }

    async fn list_users(
        &self,
        _request: Request<ListUsersRequest>,
    ) -> Result<Response<ListUsersResponse>, Status> {
        let store = access::lock(&self.store).map_err(status_from)?;
        let users: Vec<baseline::User> =
            access::fetch_all_as(&*store, Self::projection()).map_err(status_from)?;

        let total = users.len() as i32;
        Ok(Response::new(ListUsersResponse {
            users: users.into_iter().map(user_to_proto).collect(),
            total,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversions::json_to_struct;
    use contour_store::SqliteStore;
    use serde_json::json;
    use tonic::Code;

    fn service() -> UserServiceImpl<SqliteStore> {
        let store = SqliteStore::in_memory(Revision::Baseline).unwrap();
        UserServiceImpl::new(Arc::new(Mutex::new(store)))
    }

    fn create_request(email: &str) -> CreateUserRequest {
        CreateUserRequest {
            email: email.to_string(),
            name: "Ada".to_string(),
            status: "ACTIVE".to_string(),
            description: None,
            metadata: Some(json_to_struct(json!({"plan": "pro"}).as_object().unwrap())),
            tags: vec!["admin".to_string(), "beta".to_string()],
            payment_method: "CREDIT_CARD".to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_then_get() {
        let service = service();

        let created = service
            .create_user(Request::new(create_request("ada@example.com")))
            .await
            .unwrap()
            .into_inner();
        assert!(created.id > 0);

        let fetched = service
            .get_user(Request::new(GetUserRequest { id: created.id }))
            .await
            .unwrap()
            .into_inner();

        assert_eq!(fetched, created);
        assert_eq!(fetched.email, "ada@example.com");
        assert_eq!(fetched.tags, vec!["admin", "beta"]);
        assert!(fetched.metadata.unwrap().fields.contains_key("plan"));
    }

    #[tokio::test]
    async fn test_get_missing_user() {
        let service = service();

        let status = service
            .get_user(Request::new(GetUserRequest { id: 42 }))
            .await
            .unwrap_err();
        assert_eq!(status.code(), Code::NotFound);
        assert_eq!(status.message(), "User not found");
    }

    #[tokio::test]
    async fn test_create_rejects_unknown_status() {
        let service = service();

        let mut request = create_request("x@example.com");
        request.status = "SUSPENDED".to_string();
        let status = service.create_user(Request::new(request)).await.unwrap_err();
        assert_eq!(status.code(), Code::InvalidArgument);

        let list = service
            .list_users(Request::new(ListUsersRequest {}))
            .await
            .unwrap()
            .into_inner();
        assert_eq!(list.total, 0);
    }

    #[tokio::test]
    async fn test_create_rejects_bank_transfer() {
        let service = service();

        let mut request = create_request("x@example.com");
        request.payment_method = "BANK_TRANSFER".to_string();
        let status = service.create_user(Request::new(request)).await.unwrap_err();
        assert_eq!(status.code(), Code::InvalidArgument);
    }

    #[tokio::test]
    async fn test_list_users() {
        let service = service();
        for email in ["a@example.com", "b@example.com"] {
            service
                .create_user(Request::new(create_request(email)))
                .await
                .unwrap();
        }

        let list = service
            .list_users(Request::new(ListUsersRequest {}))
            .await
            .unwrap()
            .into_inner();

        assert_eq!(list.total, 2);
        assert_eq!(list.users[0].email, "a@example.com");
        assert_eq!(list.users[1].email, "b@example.com");
    }

    #[test]
    fn test_status_mapping() {
        let status = status_from(ContractError::Storage("disk".to_string()));
        assert_eq!(status.code(), Code::Internal);
    }
}
