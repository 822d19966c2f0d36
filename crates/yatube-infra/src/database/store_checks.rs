//! Behaviour shared by every `ContentStore` implementation.
//!
//! Each check takes a fresh, empty store; the in-memory and SQL test modules
//! run all of them against their own backend.

use std::sync::Arc;
use std::time::Duration;

use uuid::Uuid;

use yatube_core::domain::{
    GroupFields, NewComment, NewPost, NewUser, Ordering, Pagination, Post, PostFilter, PostQuery,
    PostUpdate, User,
};
use yatube_core::error::{ConstraintViolation, RepoError};
use yatube_core::ports::{BaseRepository, ContentStore};

async fn register(store: &dyn ContentStore, username: &str) -> User {
    store
        .users()
        .create(NewUser::new(username, "hash"))
        .await
        .unwrap()
}

/// Publish a post and wait long enough that the next one gets a later `pub_date`.
async fn publish(store: &dyn ContentStore, new: NewPost) -> Post {
    let post = store.posts().create(new).await.unwrap();
    tokio::time::sleep(Duration::from_millis(5)).await;
    post
}

fn violation(result: Result<impl std::fmt::Debug, RepoError>) -> ConstraintViolation {
    match result {
        Err(RepoError::Constraint(violation)) => violation,
        other => panic!("expected a constraint violation, got {other:?}"),
    }
}

pub(crate) async fn usernames_are_unique(store: &dyn ContentStore) {
    register(store, "auth").await;

    let dup = store.users().create(NewUser::new("auth", "other")).await;
    assert_eq!(
        violation(dup),
        ConstraintViolation::DuplicateUsername("auth".to_string())
    );

    let found = store.users().find_by_username("auth").await.unwrap();
    assert_eq!(found.map(|u| u.username), Some("auth".to_string()));
    assert_eq!(store.users().count().await.unwrap(), 1);
}

pub(crate) async fn invalid_username_is_not_stored(store: &dyn ContentStore) {
    let err = store
        .users()
        .create(NewUser::new("bad name!", "hash"))
        .await
        .unwrap_err();
    assert!(matches!(err, RepoError::Validation(ref e) if e.field == "username"));
    assert_eq!(store.users().count().await.unwrap(), 0);
}

pub(crate) async fn group_slugs_are_unique(store: &dyn ContentStore) {
    let first = store
        .groups()
        .create(GroupFields::new("Тестовая группа", "test-slug", "Тестовое описание"))
        .await
        .unwrap();

    let dup = store
        .groups()
        .create(GroupFields::new("Another", "test-slug", ""))
        .await;
    assert_eq!(
        violation(dup),
        ConstraintViolation::DuplicateSlug("test-slug".to_string())
    );

    let second = store
        .groups()
        .create(GroupFields::new("Another", "another", ""))
        .await
        .unwrap();

    // Renaming onto a taken slug fails; keeping your own slug does not.
    let clash = store
        .groups()
        .update(second.id, GroupFields::new("Another", "test-slug", ""))
        .await;
    assert_eq!(
        violation(clash),
        ConstraintViolation::DuplicateSlug("test-slug".to_string())
    );
    let renamed = store
        .groups()
        .update(first.id, GroupFields::new("Renamed", "test-slug", "new"))
        .await
        .unwrap();
    assert_eq!(renamed.title, "Renamed");
    assert_eq!(renamed.to_string(), "Renamed");

    let by_slug = store.groups().find_by_slug("test-slug").await.unwrap();
    assert_eq!(by_slug.map(|g| g.id), Some(first.id));

    let titles: Vec<String> = store
        .groups()
        .list()
        .await
        .unwrap()
        .into_iter()
        .map(|g| g.title)
        .collect();
    assert_eq!(titles, vec!["Another", "Renamed"]);
}

pub(crate) async fn blank_slug_is_rejected(store: &dyn ContentStore) {
    let err = store
        .groups()
        .create(GroupFields::new("Title", "", ""))
        .await
        .unwrap_err();
    assert!(matches!(err, RepoError::Validation(ref e) if e.field == "slug"));
}

pub(crate) async fn self_follow_is_rejected(store: &dyn ContentStore) {
    let user = register(store, "leo").await;

    let result = store.follows().follow(user.id, user.id).await;
    assert_eq!(violation(result), ConstraintViolation::SelfFollow);
    assert_eq!(store.follows().count().await.unwrap(), 0);
}

pub(crate) async fn follow_pairs_are_unique(store: &dyn ContentStore) {
    let user = register(store, "leo").await;
    let author = register(store, "auth").await;

    store.follows().follow(user.id, author.id).await.unwrap();
    let again = store.follows().follow(user.id, author.id).await;
    assert_eq!(violation(again), ConstraintViolation::DuplicateFollow);

    // The reverse direction is a different pair.
    store.follows().follow(author.id, user.id).await.unwrap();

    assert!(store.follows().is_following(user.id, author.id).await.unwrap());
    assert_eq!(store.follows().following(user.id).await.unwrap().len(), 1);
    assert_eq!(store.follows().followers(user.id).await.unwrap().len(), 1);
    assert_eq!(store.follows().count().await.unwrap(), 2);
}

pub(crate) async fn unfollow_is_idempotent(store: &dyn ContentStore) {
    let user = register(store, "leo").await;
    let author = register(store, "auth").await;
    store.follows().follow(user.id, author.id).await.unwrap();

    assert!(store.follows().unfollow(user.id, author.id).await.unwrap());
    assert!(!store.follows().unfollow(user.id, author.id).await.unwrap());
    assert!(!store.follows().is_following(user.id, author.id).await.unwrap());
}

pub(crate) async fn follow_requires_both_users(store: &dyn ContentStore) {
    let user = register(store, "leo").await;

    let result = store.follows().follow(user.id, Uuid::new_v4()).await;
    assert!(matches!(
        violation(result),
        ConstraintViolation::MissingRelation(_)
    ));
}

/// Two callers racing to create the same follow: exactly one wins.
pub(crate) async fn concurrent_follows_store_one_row(store: Arc<dyn ContentStore>) {
    let user = register(store.as_ref(), "leo").await;
    let author = register(store.as_ref(), "auth").await;

    let tasks: Vec<_> = (0..4)
        .map(|_| {
            let store = Arc::clone(&store);
            tokio::spawn(async move { store.follows().follow(user.id, author.id).await })
        })
        .collect();

    let mut created = 0;
    for task in tasks {
        match task.await.unwrap() {
            Ok(_) => created += 1,
            Err(err) => assert_eq!(err.constraint(), Some(&ConstraintViolation::DuplicateFollow)),
        }
    }

    assert_eq!(created, 1);
    assert_eq!(store.follows().count().await.unwrap(), 1);
}

pub(crate) async fn post_requires_existing_author_and_group(store: &dyn ContentStore) {
    let author = register(store, "auth").await;

    let orphan = store.posts().create(NewPost::new(Uuid::new_v4(), "text")).await;
    assert_eq!(
        violation(orphan),
        ConstraintViolation::MissingRelation("author")
    );

    let no_group = store
        .posts()
        .create(NewPost::new(author.id, "text").in_group(Uuid::new_v4()))
        .await;
    assert_eq!(
        violation(no_group),
        ConstraintViolation::MissingRelation("group")
    );

    let blank = store.posts().create(NewPost::new(author.id, "  ")).await;
    assert!(matches!(blank, Err(RepoError::Validation(ref e)) if e.field == "text"));
    assert_eq!(store.posts().count().await.unwrap(), 0);
}

pub(crate) async fn posts_list_newest_first(store: &dyn ContentStore) {
    let author = register(store, "auth").await;
    let first = publish(store, NewPost::new(author.id, "first")).await;
    let second = publish(store, NewPost::new(author.id, "second")).await;
    let third = publish(store, NewPost::new(author.id, "third")).await;

    let page = store.posts().list(PostQuery::default()).await.unwrap();
    let ids: Vec<Uuid> = page.items.iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![third.id, second.id, first.id]);
    assert_eq!(page.total, 3);

    let oldest = store
        .posts()
        .list(PostQuery::default().ordering(Ordering::OldestFirst))
        .await
        .unwrap();
    assert_eq!(oldest.items[0].id, first.id);
}

pub(crate) async fn posts_are_paginated(store: &dyn ContentStore) {
    let author = register(store, "auth").await;
    for i in 0..13 {
        publish(store, NewPost::new(author.id, format!("post {i}"))).await;
    }

    let first = store.posts().list(PostQuery::default()).await.unwrap();
    assert_eq!(first.items.len(), 10);
    assert_eq!(first.items[0].text, "post 12");
    assert!(first.has_next());

    let second = store
        .posts()
        .list(PostQuery::default().page(Pagination::new(2, 10)))
        .await
        .unwrap();
    assert_eq!(second.items.len(), 3);
    assert_eq!(second.items[2].text, "post 0");
    assert_eq!(second.total_pages(), 2);
}

pub(crate) async fn posts_filter_by_author_group_and_follows(store: &dyn ContentStore) {
    let author = register(store, "auth").await;
    let other = register(store, "other").await;
    let reader = register(store, "reader").await;
    let group = store
        .groups()
        .create(GroupFields::new("Group", "group", ""))
        .await
        .unwrap();

    let grouped = publish(store, NewPost::new(author.id, "grouped").in_group(group.id)).await;
    publish(store, NewPost::new(other.id, "loose")).await;

    let by_group = store
        .posts()
        .list(PostQuery::new(PostFilter::Group(group.id)))
        .await
        .unwrap();
    assert_eq!(by_group.items, vec![grouped.clone()]);

    let by_author = store
        .posts()
        .list(PostQuery::new(PostFilter::Author(other.id)))
        .await
        .unwrap();
    assert_eq!(by_author.items.len(), 1);
    assert_eq!(by_author.items[0].text, "loose");

    let feed = store
        .posts()
        .list(PostQuery::new(PostFilter::FollowedBy(reader.id)))
        .await
        .unwrap();
    assert!(feed.items.is_empty());

    store.follows().follow(reader.id, author.id).await.unwrap();
    let feed = store
        .posts()
        .list(PostQuery::new(PostFilter::FollowedBy(reader.id)))
        .await
        .unwrap();
    assert_eq!(feed.items, vec![grouped]);
}

pub(crate) async fn edit_keeps_author_and_pub_date(store: &dyn ContentStore) {
    let author = register(store, "auth").await;
    let group = store
        .groups()
        .create(GroupFields::new("Group", "group", ""))
        .await
        .unwrap();
    let original = publish(store, NewPost::new(author.id, "before")).await;

    let edited = store
        .posts()
        .update(
            original.id,
            PostUpdate::new("after")
                .in_group(group.id)
                .with_image("small.gif"),
        )
        .await
        .unwrap();

    assert_eq!(edited.text, "after");
    assert_eq!(edited.group_id, Some(group.id));
    assert_eq!(edited.image.as_deref(), Some("posts/small.gif"));
    assert_eq!(edited.author_id, original.author_id);
    assert_eq!(edited.pub_date, original.pub_date);

    let stored = store.posts().find_by_id(original.id).await.unwrap();
    assert_eq!(stored, Some(edited));
    assert_eq!(store.posts().count().await.unwrap(), 1);
}

pub(crate) async fn text_edit_keeps_image(store: &dyn ContentStore) {
    let author = register(store, "auth").await;
    let original = publish(store, NewPost::new(author.id, "pic").with_image("small.gif")).await;

    let edited = store
        .posts()
        .update(original.id, PostUpdate::new("edited text only"))
        .await
        .unwrap();
    assert_eq!(edited.image.as_deref(), Some("posts/small.gif"));
    let stored = store.posts().find_by_id(original.id).await.unwrap().unwrap();
    assert_eq!(stored.image.as_deref(), Some("posts/small.gif"));

    let cleared = store
        .posts()
        .update(original.id, PostUpdate::new("no picture").without_image())
        .await
        .unwrap();
    assert_eq!(cleared.image, None);
    let stored = store.posts().find_by_id(original.id).await.unwrap().unwrap();
    assert_eq!(stored.image, None);
}

pub(crate) async fn missing_rows_report_not_found(store: &dyn ContentStore) {
    let id = Uuid::new_v4();

    assert!(store.posts().find_by_id(id).await.unwrap().is_none());
    assert!(matches!(
        store.posts().delete(id).await,
        Err(RepoError::NotFound { .. })
    ));
    assert!(matches!(
        store.groups().update(id, GroupFields::new("t", "s", "")).await,
        Err(RepoError::NotFound { .. })
    ));
    assert!(matches!(
        store.comments().update(id, "text".to_string()).await,
        Err(RepoError::NotFound { .. })
    ));
}

pub(crate) async fn comments_newest_first_and_editable(store: &dyn ContentStore) {
    let author = register(store, "auth").await;
    let post = publish(store, NewPost::new(author.id, "post")).await;

    let first = store
        .comments()
        .create(NewComment::new(post.id, author.id, "first"))
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_millis(5)).await;
    let second = store
        .comments()
        .create(NewComment::new(post.id, author.id, "second"))
        .await
        .unwrap();

    let listed = store.comments().list_for_post(post.id).await.unwrap();
    assert_eq!(
        listed.iter().map(|c| c.id).collect::<Vec<_>>(),
        vec![second.id, first.id]
    );

    let edited = store
        .comments()
        .update(first.id, "changed".to_string())
        .await
        .unwrap();
    assert_eq!(edited.text, "changed");
    assert_eq!(edited.created, first.created);

    let missing_post = store
        .comments()
        .create(NewComment::new(Uuid::new_v4(), author.id, "lost"))
        .await;
    assert_eq!(
        violation(missing_post),
        ConstraintViolation::MissingRelation("post")
    );
}

pub(crate) async fn deleting_user_cascades(store: &dyn ContentStore) {
    let author = register(store, "auth").await;
    let reader = register(store, "reader").await;
    let doomed = publish(store, NewPost::new(author.id, "doomed")).await;
    store
        .comments()
        .create(NewComment::new(doomed.id, reader.id, "on the doomed post"))
        .await
        .unwrap();
    let survivor = publish(store, NewPost::new(reader.id, "survivor")).await;
    store
        .comments()
        .create(NewComment::new(survivor.id, author.id, "by the author"))
        .await
        .unwrap();
    store.follows().follow(reader.id, author.id).await.unwrap();
    store.follows().follow(author.id, reader.id).await.unwrap();

    store.users().delete(author.id).await.unwrap();

    assert!(store.users().find_by_id(author.id).await.unwrap().is_none());
    assert!(store.posts().find_by_id(doomed.id).await.unwrap().is_none());
    assert_eq!(store.posts().count().await.unwrap(), 1);
    assert_eq!(store.comments().count().await.unwrap(), 0);
    assert_eq!(store.follows().count().await.unwrap(), 0);
    assert!(matches!(
        store.users().delete(author.id).await,
        Err(RepoError::NotFound { .. })
    ));
}

pub(crate) async fn deleting_group_keeps_posts(store: &dyn ContentStore) {
    let author = register(store, "auth").await;
    let group = store
        .groups()
        .create(GroupFields::new("Group", "group", ""))
        .await
        .unwrap();
    let post = publish(store, NewPost::new(author.id, "text").in_group(group.id)).await;

    store.groups().delete(group.id).await.unwrap();

    let kept = store.posts().find_by_id(post.id).await.unwrap().unwrap();
    assert_eq!(kept.group_id, None);
    assert_eq!(kept.text, "text");
}

pub(crate) async fn deleting_post_removes_comments(store: &dyn ContentStore) {
    let author = register(store, "auth").await;
    let doomed = publish(store, NewPost::new(author.id, "doomed")).await;
    let kept = publish(store, NewPost::new(author.id, "kept")).await;
    for target in [doomed.id, kept.id] {
        store
            .comments()
            .create(NewComment::new(target, author.id, "comment"))
            .await
            .unwrap();
    }

    store.posts().delete(doomed.id).await.unwrap();

    assert!(store.comments().list_for_post(doomed.id).await.unwrap().is_empty());
    assert_eq!(store.comments().list_for_post(kept.id).await.unwrap().len(), 1);
}

/// Walk through the life of a small site: publish, follow, read the feed,
/// comment, unfollow, then remove an author.
pub(crate) async fn follow_feed_scenario(store: &dyn ContentStore) {
    let leo = register(store, "leo").await;
    let auth = register(store, "auth").await;
    let group = store
        .groups()
        .create(GroupFields::new("Тестовая группа", "test-slug", ""))
        .await
        .unwrap();

    let published = publish(
        store,
        NewPost::new(auth.id, "Тестовый пост").in_group(group.id),
    )
    .await;

    let feed = PostQuery::new(PostFilter::FollowedBy(leo.id));
    assert_eq!(store.posts().list(feed).await.unwrap().total, 0);

    let follow = store.follows().follow(leo.id, auth.id).await.unwrap();
    assert_eq!(
        follow.describe(&leo, &auth).to_string(),
        "Follower: leo, author: auth"
    );
    assert_eq!(store.posts().list(feed).await.unwrap().items, vec![published.clone()]);

    store
        .comments()
        .create(NewComment::new(published.id, leo.id, "Тестовый коментарий"))
        .await
        .unwrap();

    assert!(store.follows().unfollow(leo.id, auth.id).await.unwrap());
    assert_eq!(store.posts().list(feed).await.unwrap().total, 0);

    store.users().delete(auth.id).await.unwrap();
    assert_eq!(store.posts().count().await.unwrap(), 0);
    assert_eq!(store.comments().count().await.unwrap(), 0);
    assert_eq!(store.groups().count().await.unwrap(), 1);
    assert_eq!(store.users().count().await.unwrap(), 1);
}

pub(crate) async fn post_resolves_its_group(store: &dyn ContentStore) {
    let author = register(store, "auth").await;
    register(store, "other").await;
    let group = store
        .groups()
        .create(GroupFields::new("Test", "test-slug", ""))
        .await
        .unwrap();
    publish(store, NewPost::new(author.id, "older")).await;
    let hello = publish(store, NewPost::new(author.id, "Hello").in_group(group.id)).await;

    let profile = store
        .posts()
        .list(PostQuery::new(PostFilter::Author(author.id)))
        .await
        .unwrap();
    assert_eq!(profile.items[0].id, hello.id);

    let group_id = profile.items[0].group_id.unwrap();
    let resolved = store.groups().find_by_id(group_id).await.unwrap().unwrap();
    assert_eq!(resolved.to_string(), "Test");
}
