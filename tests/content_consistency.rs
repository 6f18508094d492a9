//! End-to-end invariants of the content graph under the public facade

use rand::Rng;
use std::sync::Arc;
use synapse::content::articles::{create_article, delete_article, get_articles_by_user, NewArticle};
use synapse::content::comments::{create_comment, delete_comment, get_comments_by_article};
use synapse::content::likes::{toggle_like, LikeAction};
use synapse::content::messages::messages_for_user;
use synapse::content::users::{create_user, delete_user, NewUser};
use synapse::{ArticleStatus, EntityStore, StatusFilter, TxnConfig, User};

fn user(store: &EntityStore, email: &str) -> User {
    create_user(
        store,
        NewUser {
            name: email.split('@').next().unwrap_or("user").to_string(),
            email: email.into(),
            password_hash: "hash".into(),
        },
    )
    .unwrap()
}

fn article(store: &EntityStore, author: &User, title: &str) -> synapse::Article {
    create_article(
        store,
        NewArticle {
            title: title.into(),
            summary: "summary".into(),
            tags: vec!["testing".into()],
            author_id: author.id,
            body: "body".into(),
            status: ArticleStatus::Published,
        },
    )
    .unwrap()
}

#[test]
fn like_counter_always_equals_membership() {
    let store = EntityStore::new();
    let author = user(&store, "author@example.com");
    let a = article(&store, &author, "counted");

    let fans: Vec<User> = (0..4)
        .map(|n| user(&store, &format!("fan{n}@example.com")))
        .collect();

    let mut rng = rand::thread_rng();
    for fan in &fans {
        // odd numbers of toggles end liked, even end unliked
        let toggles = rng.gen_range(1..=5);
        let mut last = None;
        for _ in 0..toggles {
            last = Some(
                toggle_like(&store, &a.id.to_string(), &fan.id.to_string())
                    .unwrap()
                    .action,
            );
        }
        let expect_member = toggles % 2 == 1;
        assert_eq!(last == Some(LikeAction::Liked), expect_member);
        let fan = store.users().value(&fan.id).unwrap();
        assert_eq!(fan.likes.contains(&a.id), expect_member);
    }

    let counted = store.articles().value(&a.id).unwrap().likes;
    let members = store.users().count_matching(|u| u.likes.contains(&a.id)) as u64;
    assert_eq!(counted, members);
}

#[test]
fn concurrent_toggles_settle_exactly() {
    let store = Arc::new(EntityStore::with_txn_config(TxnConfig {
        max_retries: 50,
        ..TxnConfig::default()
    }));
    let author = user(&store, "author@example.com");
    let a = article(&store, &author, "contended");
    let aid = a.id.to_string();

    let mut handles = Vec::new();
    for n in 0..8 {
        let uid = user(&store, &format!("fan{n}@example.com")).id.to_string();
        let store = Arc::clone(&store);
        let aid = aid.clone();
        handles.push(std::thread::spawn(move || {
            toggle_like(&store, &aid, &uid).unwrap();
            if n % 2 == 0 {
                toggle_like(&store, &aid, &uid).unwrap();
            }
        }));
    }
    for handle in handles {
        handle.join().unwrap();
    }

    // the 4 odd-numbered fans end liked
    let final_article = store.articles().value(&a.id).unwrap();
    assert_eq!(final_article.likes, 4);
    assert_eq!(
        store.users().count_matching(|u| u.likes.contains(&a.id)),
        4
    );
}

#[test]
fn deleted_article_leaves_no_edges_behind() {
    let store = EntityStore::new();
    let author = user(&store, "author@example.com");
    let fan = user(&store, "fan@example.com");
    let doomed = article(&store, &author, "doomed");
    let survivor = article(&store, &author, "survivor");

    toggle_like(&store, &doomed.id.to_string(), &fan.id.to_string()).unwrap();
    toggle_like(&store, &survivor.id.to_string(), &fan.id.to_string()).unwrap();
    create_comment(
        &store,
        &doomed.id.to_string(),
        &fan.id.to_string(),
        "will vanish",
    )
    .unwrap();

    delete_article(&store, &doomed.id.to_string()).unwrap();

    assert!(!store.articles().contains(&doomed.id));
    // no user still claims to like it
    assert_eq!(store.users().count_matching(|u| u.likes.contains(&doomed.id)), 0);
    // its comments are gone, the survivor's edges are intact
    assert_eq!(store.comments().len(), 0);
    let fan = store.users().value(&fan.id).unwrap();
    assert_eq!(fan.likes, vec![survivor.id]);
    // the author's list no longer mentions it
    let listed = get_articles_by_user(&store, &author.id.to_string(), StatusFilter::All).unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, survivor.id);
    // notifications about the deleted article were swept
    let inbox = messages_for_user(&store, &author.id.to_string(), 10, 0).unwrap();
    assert!(inbox.messages.iter().all(|m| m.article_id != doomed.id));
}

#[test]
fn comment_attach_and_detach_stay_symmetric() {
    let store = EntityStore::new();
    let author = user(&store, "author@example.com");
    let reader = user(&store, "reader@example.com");
    let a = article(&store, &author, "discussed");
    let aid = a.id.to_string();

    let first = create_comment(&store, &aid, &reader.id.to_string(), "first").unwrap();
    let second = create_comment(&store, &aid, &reader.id.to_string(), "second").unwrap();

    let stored = store.articles().value(&a.id).unwrap();
    assert_eq!(stored.comments, vec![first.id, second.id]);

    delete_comment(&store, &first.id.to_string()).unwrap();
    let stored = store.articles().value(&a.id).unwrap();
    assert_eq!(stored.comments, vec![second.id]);
    let listed = get_comments_by_article(&store, &aid).unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, second.id);
}

#[test]
fn deleting_a_user_withdraws_their_footprint() {
    let store = EntityStore::new();
    let leaving = user(&store, "leaving@example.com");
    let staying = user(&store, "staying@example.com");
    let their_article = article(&store, &leaving, "authored by leaver");
    let other_article = article(&store, &staying, "remains");

    toggle_like(&store, &other_article.id.to_string(), &leaving.id.to_string()).unwrap();
    toggle_like(&store, &their_article.id.to_string(), &staying.id.to_string()).unwrap();

    delete_user(&store, &leaving.id.to_string()).unwrap();

    assert!(!store.users().contains(&leaving.id));
    assert!(!store.articles().contains(&their_article.id));
    let other = store.articles().value(&other_article.id).unwrap();
    assert_eq!(other.likes, 0);
    let staying = store.users().value(&staying.id).unwrap();
    assert!(staying.likes.is_empty());
    assert!(store.messages().is_empty());
}

#[test]
fn failed_mutations_are_invisible() {
    let store = EntityStore::new();
    let author = user(&store, "author@example.com");
    let a = article(&store, &author, "steady");

    // a like by a nonexistent user must not move the counter
    let ghost = synapse::DocId::new().to_string();
    assert!(toggle_like(&store, &a.id.to_string(), &ghost).is_err());
    assert_eq!(store.articles().value(&a.id).unwrap().likes, 0);

    // a comment on a nonexistent article must leave no documents
    let gone = synapse::DocId::new().to_string();
    assert!(create_comment(&store, &gone, &author.id.to_string(), "hi").is_err());
    assert!(store.comments().is_empty());
    assert!(store.messages().is_empty());
}
