//! Article lifecycle and listing

use chrono::Utc;
use synapse_core::{
    Article, ArticleStatus, ArticleView, DocId, Error, Result, StatusFilter,
};
use synapse_store::{EntityStore, Txn};

/// Input for [`create_article`]
#[derive(Debug, Clone)]
pub struct NewArticle {
    pub title: String,
    pub summary: String,
    pub tags: Vec<String>,
    pub author_id: DocId,
    pub body: String,
    pub status: ArticleStatus,
}

/// Partial update for [`update_article`]; `None` fields are left untouched
#[derive(Debug, Clone, Default)]
pub struct ArticleUpdate {
    pub title: Option<String>,
    pub summary: Option<String>,
    pub tags: Option<Vec<String>>,
    pub body: Option<String>,
    pub status: Option<ArticleStatus>,
}

/// Lowercase, trim, drop empties, dedup preserving order
pub(crate) fn normalize_tags(tags: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for tag in tags {
        let tag = tag.trim().to_lowercase();
        if !tag.is_empty() && !out.contains(&tag) {
            out.push(tag);
        }
    }
    out
}

/// Create an article and link it into its author's article list
pub fn create_article(store: &EntityStore, input: NewArticle) -> Result<Article> {
    let title = input.title.trim().to_string();
    if title.is_empty() {
        return Err(Error::Validation("article title must not be empty".into()));
    }
    let tags = normalize_tags(&input.tags);

    store.with_txn(|txn| {
        let mut author = txn
            .user(input.author_id)
            .ok_or(Error::not_found("user", input.author_id))?;
        let now = Utc::now();
        let article = Article {
            id: DocId::new(),
            title: title.clone(),
            summary: input.summary.trim().to_string(),
            tags: tags.clone(),
            author_id: author.id,
            author_name: author.name.clone(),
            body: input.body.clone(),
            status: input.status,
            likes: 0,
            comments: Vec::new(),
            created_at: now,
            updated_at: now,
        };
        author.articles.push(article.id);
        author.updated_at = now;
        txn.put_user(author);
        txn.put_article(article.clone());
        Ok(article)
    })
}

/// Fetch one article by its raw id
pub fn get_article_by_id(store: &EntityStore, id: &str) -> Result<Article> {
    let article_id = DocId::parse(id)?;
    store
        .articles()
        .value(&article_id)
        .ok_or(Error::not_found("article", article_id))
}

/// Resolve an article's author without loading the body into the caller
pub fn get_author_id(store: &EntityStore, id: &str) -> Result<DocId> {
    Ok(get_article_by_id(store, id)?.author_id)
}

/// Apply a partial update and bump `updated_at`
pub fn update_article(store: &EntityStore, id: &str, update: ArticleUpdate) -> Result<Article> {
    let article_id = DocId::parse(id)?;
    if let Some(title) = &update.title {
        if title.trim().is_empty() {
            return Err(Error::Validation("article title must not be empty".into()));
        }
    }

    store.with_txn(|txn| {
        let mut article = txn
            .article(article_id)
            .ok_or(Error::not_found("article", article_id))?;
        if let Some(title) = &update.title {
            article.title = title.trim().to_string();
        }
        if let Some(summary) = &update.summary {
            article.summary = summary.trim().to_string();
        }
        if let Some(tags) = &update.tags {
            article.tags = normalize_tags(tags);
        }
        if let Some(body) = &update.body {
            article.body = body.clone();
        }
        if let Some(status) = update.status {
            article.status = status;
        }
        article.updated_at = Utc::now();
        txn.put_article(article.clone());
        Ok(article)
    })
}

/// Detach an article from the whole graph inside an open transaction
///
/// Purges every liker's `likes` entry, deletes attached comments, unlinks the
/// author's article list and finally deletes the article document. The author
/// unlink happens last so it observes any like-purge already buffered for the
/// same user.
pub(crate) fn remove_article(txn: &mut Txn<'_>, article: &Article) {
    for mut liker in txn.users_liking(article.id) {
        liker.likes.retain(|id| *id != article.id);
        liker.updated_at = Utc::now();
        txn.put_user(liker);
    }
    for comment in txn.comments_of(article.id) {
        txn.delete_comment(comment.id);
    }
    if let Some(mut author) = txn.user(article.author_id) {
        author.articles.retain(|id| *id != article.id);
        author.updated_at = Utc::now();
        txn.put_user(author);
    }
    txn.delete_article(article.id);
}

/// Delete an article and every edge pointing at it
pub fn delete_article(store: &EntityStore, id: &str) -> Result<()> {
    let article_id = DocId::parse(id)?;
    store.with_txn(|txn| {
        let article = txn
            .article(article_id)
            .ok_or(Error::not_found("article", article_id))?;
        remove_article(txn, &article);
        Ok(())
    })?;
    // notifications are append-only per user and not part of the graph; stale
    // ones pointing at the deleted article are swept outside the transaction
    store.single_write(|_| {
        store
            .messages()
            .remove_matching(|m| m.article_id == article_id)
    });
    Ok(())
}

/// Newest articles first, windowed
pub fn get_latest_articles(
    store: &EntityStore,
    status: StatusFilter,
    limit: usize,
    skip: usize,
    include_body: bool,
) -> Vec<ArticleView> {
    let mut articles = store.articles().filter(|a| status.admits(a.status));
    articles.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    articles
        .into_iter()
        .skip(skip)
        .take(limit)
        .map(|a| ArticleView::project(&a, include_body))
        .collect()
}

/// Every article by one author, newest first
pub fn get_articles_by_user(
    store: &EntityStore,
    user_id: &str,
    status: StatusFilter,
) -> Result<Vec<ArticleView>> {
    let author_id = DocId::parse(user_id)?;
    let mut articles = store
        .articles()
        .filter(|a| a.author_id == author_id && status.admits(a.status));
    articles.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    Ok(articles
        .into_iter()
        .map(|a| ArticleView::project(&a, false))
        .collect())
}

/// Most recently touched articles, for the admin dashboard
pub fn get_recently_updated_articles(store: &EntityStore, limit: usize) -> Vec<ArticleView> {
    let mut articles = store.articles().filter(|_| true);
    articles.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
    articles
        .into_iter()
        .take(limit)
        .map(|a| ArticleView::project(&a, false))
        .collect()
}
