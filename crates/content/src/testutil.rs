//! Shared fixtures for the mutator tests

use crate::articles::{create_article, NewArticle};
use crate::users::{create_user, NewUser};
use synapse_core::{Article, ArticleStatus, User};
use synapse_store::EntityStore;

pub(crate) fn seeded_user(store: &EntityStore, email: &str) -> User {
    create_user(
        store,
        NewUser {
            name: "Ada".into(),
            email: email.into(),
            password_hash: "hash".into(),
        },
    )
    .unwrap()
}

pub(crate) fn seeded_article(store: &EntityStore, author: &User) -> Article {
    create_article(
        store,
        NewArticle {
            title: "Borrow checker field notes".into(),
            summary: "notes".into(),
            tags: vec!["rust".into()],
            author_id: author.id,
            body: "body".into(),
            status: ArticleStatus::Published,
        },
    )
    .unwrap()
}
