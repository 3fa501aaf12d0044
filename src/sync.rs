//! Synchronizations between concepts.
//!
//! Handlers call into [`Synchronizer`], which resolves usernames to user ids
//! through the user concept, calls one or more concepts, and turns ids back
//! into usernames for the response. It owns no state beyond references to the
//! concept services, and it never catches concept errors. Every lookup a
//! synchronization depends on runs before its first write.

use uuid::Uuid;

use crate::{
    api::error::{self, ConceptError},
    modules::{
        badge::{model::BadgeResponse, schema::BadgeType, service::BadgeService},
        post::{model::PostResponse, schema::PostOptions, service::PostService},
        relationship::{model::FriendRequestResponse, service::RelationshipService},
        report::{model::Report, service::ReportService},
        session::service::SessionService,
        user::{model::UserResponse, service::UserService},
    },
    utils::Claims,
};

/// Signing key and lifetime of issued session tokens.
#[derive(Clone)]
pub struct SessionKeys {
    pub secret: String,
    pub expiration: u64,
}

#[derive(Clone)]
pub struct Synchronizer {
    users: UserService,
    sessions: SessionService,
    posts: PostService,
    relationships: RelationshipService,
    badges: BadgeService,
    reports: ReportService,
    keys: SessionKeys,
}

impl Synchronizer {
    pub fn with_dependencies(
        users: UserService,
        sessions: SessionService,
        posts: PostService,
        relationships: RelationshipService,
        badges: BadgeService,
        reports: ReportService,
        keys: SessionKeys,
    ) -> Self {
        Synchronizer { users, sessions, posts, relationships, badges, reports, keys }
    }

    // Users and sessions

    /// Claims of a token whose session is still open.
    pub async fn verify_session(&self, token: &str) -> Result<Claims, error::SystemError> {
        let claims = Claims::decode(token, self.keys.secret.as_bytes())?;
        if self.sessions.get_user(claims.sid).await? != claims.sub {
            return Err(ConceptError::not_allowed("Must be logged in!").into());
        }
        Ok(claims)
    }

    pub async fn session_user(&self, actor: Uuid) -> Result<UserResponse, error::SystemError> {
        self.users.get_user_by_id(actor).await
    }

    pub async fn get_users(&self) -> Result<Vec<UserResponse>, error::SystemError> {
        self.users.get_users().await
    }

    pub async fn get_user(&self, username: &str) -> Result<UserResponse, error::SystemError> {
        self.users.get_user_by_username(username).await
    }

    pub async fn create_user(
        &self,
        username: &str,
        password: &str,
    ) -> Result<UserResponse, error::SystemError> {
        self.users.create(username, password).await
    }

    pub async fn log_in(
        &self,
        username: &str,
        password: &str,
    ) -> Result<String, error::SystemError> {
        let actor = self.users.authenticate(username, password).await?;
        let session = self.sessions.start(actor).await?;
        Claims::new(&actor, &session, self.keys.expiration).encode(self.keys.secret.as_bytes())
    }

    pub async fn log_out(&self, session: Uuid) -> Result<(), error::SystemError> {
        self.sessions.end(session).await
    }

    pub async fn update_username(
        &self,
        actor: Uuid,
        username: &str,
    ) -> Result<(), error::SystemError> {
        self.users.update_username(actor, username).await
    }

    pub async fn update_password(
        &self,
        actor: Uuid,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), error::SystemError> {
        self.users.update_password(actor, current_password, new_password).await
    }

    /// Deletes the account along with its sessions and relationships. The
    /// account record is removed last.
    pub async fn delete_user(&self, actor: Uuid) -> Result<(), error::SystemError> {
        self.users.get_user_by_id(actor).await?;
        self.relationships.forget_user(actor).await?;
        self.sessions.end_all(actor).await?;
        self.users.delete(actor).await
    }

    // Posts

    pub async fn get_posts(
        &self,
        author: Option<&str>,
    ) -> Result<Vec<PostResponse>, error::SystemError> {
        let posts = match author {
            Some(author) => self.posts.get_by_author(self.users.resolve(author).await?).await?,
            None => self.posts.get_posts().await?,
        };

        let authors: Vec<Uuid> = posts.iter().map(|post| post.author).collect();
        let names = self.users.ids_to_usernames(&authors).await?;

        Ok(posts.into_iter().zip(names).map(|(post, name)| PostResponse::new(post, name)).collect())
    }

    pub async fn create_post(
        &self,
        actor: Uuid,
        content: &str,
        options: Option<PostOptions>,
    ) -> Result<PostResponse, error::SystemError> {
        let author = self.users.get_user_by_id(actor).await?.username;
        let post = self.posts.create(actor, content, options).await?;
        Ok(PostResponse::new(post, author))
    }

    pub async fn update_post(
        &self,
        actor: Uuid,
        id: Uuid,
        content: Option<String>,
        options: Option<PostOptions>,
    ) -> Result<(), error::SystemError> {
        self.posts.assert_author_is_user(id, actor).await?;
        self.posts.update(id, content, options).await
    }

    pub async fn delete_post(&self, actor: Uuid, id: Uuid) -> Result<(), error::SystemError> {
        self.posts.assert_author_is_user(id, actor).await?;
        self.posts.delete(id).await
    }

    // Friends

    pub async fn get_friends(&self, actor: Uuid) -> Result<Vec<String>, error::SystemError> {
        let friends = self.relationships.get_friends(actor).await?;
        self.users.ids_to_usernames(&friends).await
    }

    pub async fn remove_friend(&self, actor: Uuid, friend: &str) -> Result<(), error::SystemError> {
        let friend = self.users.resolve(friend).await?;
        self.relationships.remove_friend(actor, friend).await
    }

    pub async fn get_friend_requests(
        &self,
        actor: Uuid,
    ) -> Result<Vec<FriendRequestResponse>, error::SystemError> {
        let requests = self.relationships.get_requests(actor).await?;

        let ids: Vec<Uuid> = requests.iter().flat_map(|r| [r.from, r.to]).collect();
        let names = self.users.ids_to_usernames(&ids).await?;

        Ok(requests
            .iter()
            .zip(names.chunks_exact(2))
            .map(|(request, pair)| FriendRequestResponse {
                id: request.id,
                from: pair[0].clone(),
                to: pair[1].clone(),
            })
            .collect())
    }

    /// The actor is always the sender.
    pub async fn send_friend_request(
        &self,
        actor: Uuid,
        to: &str,
    ) -> Result<FriendRequestResponse, error::SystemError> {
        let from = self.users.get_user_by_id(actor).await?.username;
        let to_id = self.users.resolve(to).await?;
        let request = self.relationships.send_request(actor, to_id).await?;

        Ok(FriendRequestResponse { id: request.id, from, to: to.to_owned() })
    }

    /// The actor is always the sender.
    pub async fn remove_friend_request(
        &self,
        actor: Uuid,
        to: &str,
    ) -> Result<(), error::SystemError> {
        let to = self.users.resolve(to).await?;
        self.relationships.remove_request(actor, to).await
    }

    /// The actor is always the addressee.
    pub async fn accept_friend_request(
        &self,
        actor: Uuid,
        from: &str,
    ) -> Result<(), error::SystemError> {
        let from = self.users.resolve(from).await?;
        self.relationships.accept_request(from, actor).await?;
        Ok(())
    }

    /// The actor is always the addressee.
    pub async fn reject_friend_request(
        &self,
        actor: Uuid,
        from: &str,
    ) -> Result<(), error::SystemError> {
        let from = self.users.resolve(from).await?;
        self.relationships.reject_request(from, actor).await
    }

    // Badges

    pub async fn get_badges(&self, author: &str) -> Result<Vec<BadgeResponse>, error::SystemError> {
        let author_id = self.users.resolve(author).await?;
        let badges = self.badges.get_by_author(author_id).await?;

        Ok(badges
            .into_iter()
            .map(|badge| BadgeResponse {
                id: badge.id,
                author: author.to_owned(),
                kind: badge.kind,
            })
            .collect())
    }

    pub async fn give_badge(
        &self,
        actor: Uuid,
        kind: BadgeType,
    ) -> Result<BadgeResponse, error::SystemError> {
        let author = self.users.get_user_by_id(actor).await?.username;
        let badge = self.badges.give(actor, kind).await?;
        Ok(BadgeResponse { id: badge.id, author, kind: badge.kind })
    }

    pub async fn delete_badge(&self, id: Uuid) -> Result<(), error::SystemError> {
        self.badges.remove(id).await
    }

    // Reports

    pub async fn get_reports(&self) -> Result<Vec<Report>, error::SystemError> {
        self.reports.get_reports().await
    }

    pub async fn create_report(
        &self,
        item: Uuid,
        info: Option<String>,
    ) -> Result<Report, error::SystemError> {
        self.reports.create(item, info).await
    }

    pub async fn address_report(&self, id: Uuid, validity: bool) -> Result<(), error::SystemError> {
        self.reports.address(id, validity).await
    }
}

#[cfg(test)]
impl Synchronizer {
    /// Every concept on its own memory store, unique keys included.
    pub fn in_memory(secret: &str) -> Self {
        use std::sync::Arc;

        use crate::{
            modules::{
                badge::schema::BadgeDoc,
                post::schema::PostDoc,
                relationship::schema::{RelationshipDoc, PAIR_FIELD},
                report::schema::ReportDoc,
                session::schema::SessionDoc,
                user::schema::{UserDoc, USERNAME_FIELD},
            },
            store::MemoryStore,
        };

        Synchronizer::with_dependencies(
            UserService::with_store(Arc::new(
                MemoryStore::<UserDoc>::new("users").with_unique_key(USERNAME_FIELD),
            )),
            SessionService::with_store(Arc::new(MemoryStore::<SessionDoc>::new("sessions"))),
            PostService::with_store(Arc::new(MemoryStore::<PostDoc>::new("posts"))),
            RelationshipService::with_store(Arc::new(
                MemoryStore::<RelationshipDoc>::new("relationships").with_unique_key(PAIR_FIELD),
            )),
            BadgeService::with_store(Arc::new(MemoryStore::<BadgeDoc>::new("badges"))),
            ReportService::with_store(Arc::new(MemoryStore::<ReportDoc>::new("reports"))),
            SessionKeys { secret: secret.into(), expiration: 60 },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret";

    fn synchronizer() -> Synchronizer {
        Synchronizer::in_memory(SECRET)
    }

    async fn sign_up(sync: &Synchronizer, username: &str) -> Uuid {
        sync.create_user(username, "password").await.expect("sign up").id
    }

    fn kind(err: error::SystemError) -> ConceptError {
        err.concept().cloned().expect("domain error")
    }

    #[tokio::test]
    async fn friend_request_flow_by_username() {
        let sync = synchronizer();
        let alice = sign_up(&sync, "alice").await;
        let bob = sign_up(&sync, "bob").await;

        let sent = sync.send_friend_request(alice, "bob").await.expect("send");
        assert_eq!((sent.from.as_str(), sent.to.as_str()), ("alice", "bob"));

        let inbox = sync.get_friend_requests(bob).await.expect("requests");
        assert_eq!(inbox.len(), 1);
        assert_eq!((inbox[0].from.as_str(), inbox[0].to.as_str()), ("alice", "bob"));

        sync.accept_friend_request(bob, "alice").await.expect("accept");
        assert_eq!(sync.get_friends(alice).await.expect("friends"), vec!["bob"]);
        assert_eq!(sync.get_friends(bob).await.expect("friends"), vec!["alice"]);
        assert!(sync.get_friend_requests(alice).await.expect("requests").is_empty());

        sync.remove_friend(alice, "bob").await.expect("unfriend");
        assert!(sync.get_friends(bob).await.expect("friends").is_empty());
    }

    #[tokio::test]
    async fn sender_cannot_accept_or_reject_their_own_request() {
        let sync = synchronizer();
        let alice = sign_up(&sync, "alice").await;
        sign_up(&sync, "bob").await;

        sync.send_friend_request(alice, "bob").await.expect("send");

        let err = sync.accept_friend_request(alice, "bob").await.expect_err("own request");
        assert!(matches!(kind(err), ConceptError::NotFound(_)));
        let err = sync.reject_friend_request(alice, "bob").await.expect_err("own request");
        assert!(matches!(kind(err), ConceptError::NotFound(_)));

        sync.remove_friend_request(alice, "bob").await.expect("withdraw");
        assert!(sync.get_friend_requests(alice).await.expect("requests").is_empty());
    }

    #[tokio::test]
    async fn unknown_usernames_fail_before_touching_relationships() {
        let sync = synchronizer();
        let alice = sign_up(&sync, "alice").await;

        let err = sync.send_friend_request(alice, "ghost").await.expect_err("no such user");
        assert!(matches!(kind(err), ConceptError::NotFound(_)));
        assert!(sync.get_friend_requests(alice).await.expect("requests").is_empty());
    }

    #[tokio::test]
    async fn deleted_sender_leaves_no_request_behind() {
        let sync = synchronizer();
        let alice = sign_up(&sync, "alice").await;
        let bob = sign_up(&sync, "bob").await;

        sync.delete_user(alice).await.expect("delete");

        let err = sync.send_friend_request(alice, "bob").await.expect_err("sender is gone");
        assert!(matches!(kind(err), ConceptError::NotFound(_)));
        assert!(sync.get_friend_requests(bob).await.expect("requests").is_empty());
    }

    #[tokio::test]
    async fn mirrored_request_surfaces_duplicate_error() {
        let sync = synchronizer();
        let alice = sign_up(&sync, "alice").await;
        let bob = sign_up(&sync, "bob").await;

        sync.send_friend_request(alice, "bob").await.expect("send");
        let err = sync.send_friend_request(bob, "alice").await.expect_err("mirrored");
        assert_eq!(kind(err), ConceptError::DuplicateRequest(bob, alice));
    }

    #[tokio::test]
    async fn deleted_users_leave_no_relationships_behind() {
        let sync = synchronizer();
        let alice = sign_up(&sync, "alice").await;
        let bob = sign_up(&sync, "bob").await;

        sync.send_friend_request(alice, "bob").await.expect("send");
        sync.accept_friend_request(bob, "alice").await.expect("accept");

        sync.delete_user(alice).await.expect("delete");
        assert!(sync.get_friends(bob).await.expect("friends").is_empty());

        let err = sync.delete_user(alice).await.expect_err("already deleted");
        assert!(matches!(kind(err), ConceptError::NotFound(_)));
    }

    #[tokio::test]
    async fn log_in_opens_a_session_that_log_out_closes() {
        let sync = synchronizer();
        let alice = sign_up(&sync, "alice").await;

        let token = sync.log_in("alice", "password").await.expect("log in");
        let claims = sync.verify_session(&token).await.expect("valid session");
        assert_eq!(claims.sub, alice);

        sync.log_out(claims.sid).await.expect("log out");
        let err = sync.verify_session(&token).await.expect_err("session ended");
        assert!(matches!(kind(err), ConceptError::NotAllowed(_)));

        let err = sync.log_in("alice", "nope").await.expect_err("bad password");
        assert!(matches!(kind(err), ConceptError::NotAllowed(_)));
    }

    #[tokio::test]
    async fn deleting_an_account_ends_its_sessions() {
        let sync = synchronizer();
        let alice = sign_up(&sync, "alice").await;
        let token = sync.log_in("alice", "password").await.expect("log in");

        sync.delete_user(alice).await.expect("delete");
        assert!(sync.verify_session(&token).await.is_err());
    }

    #[tokio::test]
    async fn posts_are_shaped_with_usernames_and_guarded_by_author() {
        let sync = synchronizer();
        let alice = sign_up(&sync, "alice").await;
        let bob = sign_up(&sync, "bob").await;

        let post = sync.create_post(alice, "hello", None).await.expect("create");
        assert_eq!(post.author, "alice");
        sync.create_post(bob, "hi", None).await.expect("create");

        assert_eq!(sync.get_posts(None).await.expect("all").len(), 2);
        let by_alice = sync.get_posts(Some("alice")).await.expect("by author");
        assert_eq!(by_alice.len(), 1);
        assert_eq!(by_alice[0].id, post.id);

        let err = sync
            .update_post(bob, post.id, Some("mine now".into()), None)
            .await
            .expect_err("not author");
        assert!(matches!(kind(err), ConceptError::NotAllowed(_)));
        let err = sync.delete_post(bob, post.id).await.expect_err("not author");
        assert!(matches!(kind(err), ConceptError::NotAllowed(_)));

        sync.update_post(alice, post.id, Some("edited".into()), None).await.expect("update");
        let by_alice = sync.get_posts(Some("alice")).await.expect("by author");
        assert_eq!(by_alice[0].content, "edited");

        sync.delete_post(alice, post.id).await.expect("delete");
        assert!(sync.get_posts(Some("alice")).await.expect("by author").is_empty());
    }

    #[tokio::test]
    async fn badges_are_shaped_with_usernames() {
        let sync = synchronizer();
        let alice = sign_up(&sync, "alice").await;

        let badge = sync.give_badge(alice, BadgeType::Verified).await.expect("give");
        assert_eq!(badge.author, "alice");

        let listed = sync.get_badges("alice").await.expect("badges");
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, badge.id);

        sync.delete_badge(badge.id).await.expect("remove");
        assert!(sync.get_badges("alice").await.expect("badges").is_empty());
    }
}
