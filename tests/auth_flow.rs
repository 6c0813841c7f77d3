//! End-to-end flow over the in-memory store: register, sign in, post and
//! moderate content, sign out.

use std::sync::Arc;

use demando::auth::{self, DenyReason, Registrar, SessionManager, SignedIn, Signup};
use demando::domain::{NewUser, Role, User};
use demando::service::{AnswerService, QuestionError, QuestionService, UserError, UserService};
use demando::store::{MemoryStore, UserInsert, UserStore};
use secrecy::SecretString;

struct Harness {
    store: Arc<MemoryStore>,
    registrar: Registrar,
    sessions: SessionManager,
    questions: QuestionService,
    answers: AnswerService,
    users: UserService,
}

impl Harness {
    fn new() -> Self {
        let store = Arc::new(MemoryStore::new());
        let users: Arc<dyn UserStore> = store.clone();
        let sessions = SessionManager::new(store.clone(), store.clone());
        Self {
            registrar: Registrar::new(users.clone()),
            questions: QuestionService::new(sessions.clone(), store.clone(), store.clone()),
            answers: AnswerService::new(sessions.clone(), store.clone(), store.clone()),
            users: UserService::new(sessions.clone(), users),
            sessions,
            store,
        }
    }

    async fn register(&self, username: &str, password: &str) -> User {
        self.registrar
            .register(Signup {
                username: username.to_string(),
                email: format!("{username}@example.com"),
                first_name: "Test".to_string(),
                last_name: "User".to_string(),
                password: SecretString::from(password),
            })
            .await
            .expect("registration should succeed")
    }

    async fn sign_in(&self, username: &str, password: &str) -> SignedIn {
        self.sessions
            .sign_in(username, &SecretString::from(password))
            .await
            .expect("sign in should succeed")
    }

    /// Admins are provisioned out of band, not through signup.
    async fn seed_admin(&self, username: &str, password: &str) -> User {
        let credentials = auth::password::hash(password).expect("hashing should succeed");
        let outcome = UserStore::insert(
            self.store.as_ref(),
            NewUser {
                username: username.to_string(),
                email: format!("{username}@example.com"),
                first_name: "Site".to_string(),
                last_name: "Admin".to_string(),
                role: Role::Admin,
                password_hash: credentials.hash,
                password_salt: credentials.salt,
            },
        )
        .await
        .expect("insert should succeed");
        match outcome {
            UserInsert::Created(user) => user,
            other => panic!("unexpected outcome: {other:?}"),
        }
    }
}

#[tokio::test]
async fn full_member_flow() {
    let harness = Harness::new();

    let alice = harness.register("alice", "hunter2").await;
    assert_eq!(alice.role, Role::Member);

    let signed_in = harness.sign_in("alice", "hunter2").await;
    assert_eq!(signed_in.user.id, alice.id);

    let question = harness
        .questions
        .create(&signed_in.token, "What is ownership?".to_string())
        .await
        .expect("question creation should succeed");
    assert_eq!(question.user_id, alice.id);

    let listed = harness
        .questions
        .all(&signed_in.token)
        .await
        .expect("listing should succeed");
    assert_eq!(listed.len(), 1);

    let answer = harness
        .answers
        .create(&signed_in.token, question.id, "A discipline.".to_string())
        .await
        .expect("answer creation should succeed");
    assert_eq!(answer.question_id, question.id);

    harness
        .sessions
        .sign_out(&signed_in.token)
        .await
        .expect("sign out should succeed");

    // A signed-out token stops working and reads as signed out, not unknown.
    let err = harness
        .questions
        .all(&signed_in.token)
        .await
        .expect_err("signed-out token should be rejected");
    assert!(matches!(
        err,
        QuestionError::Auth(auth::Error::SignedOut)
    ));
}

#[tokio::test]
async fn only_the_owner_may_edit() {
    let harness = Harness::new();

    harness.register("alice", "hunter2").await;
    harness.register("bob", "sekret").await;

    let alice = harness.sign_in("alice", "hunter2").await;
    let bob = harness.sign_in("bob", "sekret").await;

    let question = harness
        .questions
        .create(&alice.token, "Why borrow?".to_string())
        .await
        .expect("question creation should succeed");

    let err = harness
        .questions
        .edit(&bob.token, question.id, "hijacked".to_string())
        .await
        .expect_err("non-owner edit should be denied");
    assert!(matches!(
        err,
        QuestionError::Auth(auth::Error::Denied(DenyReason::NotOwner))
    ));

    // Admins cannot edit either; editing stays owner-exclusive.
    harness.seed_admin("root", "toor").await;
    let admin = harness.sign_in("root", "toor").await;
    let err = harness
        .questions
        .edit(&admin.token, question.id, "overruled".to_string())
        .await
        .expect_err("admin edit should be denied");
    assert!(matches!(
        err,
        QuestionError::Auth(auth::Error::Denied(DenyReason::NotOwner))
    ));

    // Deletion allows the admin in.
    harness
        .questions
        .delete(&admin.token, question.id)
        .await
        .expect("admin delete should succeed");
}

#[tokio::test]
async fn user_removal_is_admin_only() {
    let harness = Harness::new();

    let alice = harness.register("alice", "hunter2").await;
    harness.register("bob", "sekret").await;
    harness.seed_admin("root", "toor").await;

    let bob = harness.sign_in("bob", "sekret").await;
    let err = harness
        .users
        .delete(&bob.token, alice.id)
        .await
        .expect_err("member delete should be denied");
    assert!(matches!(
        err,
        UserError::Auth(auth::Error::Denied(DenyReason::NotAdmin))
    ));

    let admin = harness.sign_in("root", "toor").await;
    let removed = harness
        .users
        .delete(&admin.token, alice.id)
        .await
        .expect("admin delete should succeed");
    assert_eq!(removed.id, alice.id);

    // The removed user's profile is gone.
    let err = harness
        .users
        .profile(&admin.token, alice.id)
        .await
        .expect_err("profile of a removed user should be missing");
    assert!(matches!(err, UserError::NotFound));
}

#[tokio::test]
async fn duplicate_usernames_and_emails_conflict() {
    let harness = Harness::new();

    harness.register("alice", "hunter2").await;

    let err = harness
        .registrar
        .register(Signup {
            username: "alice".to_string(),
            email: "other@example.com".to_string(),
            first_name: String::new(),
            last_name: String::new(),
            password: SecretString::from("pw"),
        })
        .await
        .expect_err("duplicate username should conflict");
    assert!(matches!(err, auth::Error::DuplicateUsername));

    let err = harness
        .registrar
        .register(Signup {
            username: "alice2".to_string(),
            email: "alice@example.com".to_string(),
            first_name: String::new(),
            last_name: String::new(),
            password: SecretString::from("pw"),
        })
        .await
        .expect_err("duplicate email should conflict");
    assert!(matches!(err, auth::Error::DuplicateEmail));
}
