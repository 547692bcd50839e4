//! Collaborator seams for persistence plus the in-memory implementations
//! the binary and the tests run with. The pipeline only ever sees the
//! traits; a real document store slots in behind them.

use std::sync::Mutex;

use anyhow::Result;
use async_trait::async_trait;
use uuid::Uuid;

use crate::model::{ImpactLevel, Post, Project};

/// Directory of tracked projects, keyed by id and by twitter handle.
#[async_trait]
pub trait ProjectDirectory: Send + Sync {
    async fn find_by_id(&self, id: &str) -> Result<Option<Project>>;
    /// First match wins; handle uniqueness is not enforced here.
    async fn find_by_handle(&self, handle: &str) -> Result<Option<Project>>;
    async fn list_all(&self, active_only: bool) -> Result<Vec<Project>>;
    /// Assigns the id; returns the stored project.
    async fn create(&self, project: Project) -> Result<Project>;
    /// Returns false when no project with that id exists.
    async fn update(&self, project: &Project) -> Result<bool>;
    async fn delete(&self, id: &str) -> Result<bool>;
}

/// Store of ingested posts. Listing queries return newest first.
#[async_trait]
pub trait PostStore: Send + Sync {
    /// Inserts and returns the assigned document id.
    async fn insert(&self, post: Post) -> Result<String>;
    async fn find_by_id(&self, id: &str) -> Result<Option<Post>>;
    async fn find_by_external_id(&self, tweet_id: &str) -> Result<Option<Post>>;
    async fn find_by_project(&self, project_id: &str, limit: usize) -> Result<Vec<Post>>;
    async fn find_recent(&self, limit: usize) -> Result<Vec<Post>>;
    async fn find_by_impact_level(&self, level: ImpactLevel, limit: usize) -> Result<Vec<Post>>;
}

/// In-memory project directory guarded by a mutex.
#[derive(Debug, Default)]
pub struct MemoryProjectDirectory {
    inner: Mutex<Vec<Project>>,
}

impl MemoryProjectDirectory {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProjectDirectory for MemoryProjectDirectory {
    async fn find_by_id(&self, id: &str) -> Result<Option<Project>> {
        let v = self.inner.lock().expect("directory mutex poisoned");
        Ok(v.iter().find(|p| p.id == id).cloned())
    }

    async fn find_by_handle(&self, handle: &str) -> Result<Option<Project>> {
        let v = self.inner.lock().expect("directory mutex poisoned");
        Ok(v.iter().find(|p| p.twitter_username == handle).cloned())
    }

    async fn list_all(&self, active_only: bool) -> Result<Vec<Project>> {
        let v = self.inner.lock().expect("directory mutex poisoned");
        Ok(v.iter()
            .filter(|p| !active_only || p.active)
            .cloned()
            .collect())
    }

    async fn create(&self, mut project: Project) -> Result<Project> {
        project.id = Uuid::new_v4().to_string();
        let mut v = self.inner.lock().expect("directory mutex poisoned");
        v.push(project.clone());
        Ok(project)
    }

    async fn update(&self, project: &Project) -> Result<bool> {
        let mut v = self.inner.lock().expect("directory mutex poisoned");
        match v.iter_mut().find(|p| p.id == project.id) {
            Some(slot) => {
                *slot = project.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        let mut v = self.inner.lock().expect("directory mutex poisoned");
        let before = v.len();
        v.retain(|p| p.id != id);
        Ok(v.len() < before)
    }
}

/// In-memory post store guarded by a mutex; append-only on the hot path.
#[derive(Debug, Default)]
pub struct MemoryPostStore {
    inner: Mutex<Vec<Post>>,
}

impl MemoryPostStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn newest_first<F>(&self, limit: usize, pred: F) -> Vec<Post>
    where
        F: Fn(&Post) -> bool,
    {
        let v = self.inner.lock().expect("post store mutex poisoned");
        let mut out: Vec<Post> = v.iter().filter(|p| pred(p)).cloned().collect();
        out.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        out.truncate(limit);
        out
    }
}

#[async_trait]
impl PostStore for MemoryPostStore {
    async fn insert(&self, mut post: Post) -> Result<String> {
        let id = Uuid::new_v4().to_string();
        post.id = Some(id.clone());
        let mut v = self.inner.lock().expect("post store mutex poisoned");
        v.push(post);
        Ok(id)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Post>> {
        let v = self.inner.lock().expect("post store mutex poisoned");
        Ok(v.iter().find(|p| p.id.as_deref() == Some(id)).cloned())
    }

    async fn find_by_external_id(&self, tweet_id: &str) -> Result<Option<Post>> {
        let v = self.inner.lock().expect("post store mutex poisoned");
        Ok(v.iter().find(|p| p.tweet_id == tweet_id).cloned())
    }

    async fn find_by_project(&self, project_id: &str, limit: usize) -> Result<Vec<Post>> {
        Ok(self.newest_first(limit, |p| p.project_id == project_id))
    }

    async fn find_recent(&self, limit: usize) -> Result<Vec<Post>> {
        Ok(self.newest_first(limit, |_| true))
    }

    async fn find_by_impact_level(&self, level: ImpactLevel, limit: usize) -> Result<Vec<Post>> {
        Ok(self.newest_first(limit, |p| {
            p.analysis.as_ref().is_some_and(|a| a.impact_level == level)
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Analysis;
    use chrono::{Duration, Utc};

    fn project(handle: &str, symbol: &str) -> Project {
        Project {
            id: String::new(),
            name: format!("{handle} project"),
            token_symbol: symbol.to_string(),
            twitter_username: handle.to_string(),
            description: String::new(),
            active: true,
            created_at: Utc::now(),
        }
    }

    fn post(tweet_id: &str, project_id: &str, age_mins: i64, level: ImpactLevel) -> Post {
        let mut analysis = Analysis::fallback();
        analysis.impact_level = level;
        Post {
            id: None,
            tweet_id: tweet_id.to_string(),
            project_id: project_id.to_string(),
            twitter_username: "acme".to_string(),
            token_symbol: "ACM".to_string(),
            text: "hello".to_string(),
            created_at: Utc::now() - Duration::minutes(age_mins),
            analysis: Some(analysis),
        }
    }

    #[tokio::test]
    async fn directory_roundtrip_and_handle_lookup() {
        let dir = MemoryProjectDirectory::new();
        let created = dir.create(project("acmecoin", "ACM")).await.unwrap();
        assert!(!created.id.is_empty());

        let by_id = dir.find_by_id(&created.id).await.unwrap().unwrap();
        assert_eq!(by_id.token_symbol, "ACM");

        let by_handle = dir.find_by_handle("acmecoin").await.unwrap().unwrap();
        assert_eq!(by_handle.id, created.id);

        assert!(dir.find_by_handle("nobody").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn directory_first_match_wins_on_duplicate_handles() {
        let dir = MemoryProjectDirectory::new();
        let first = dir.create(project("dup", "ONE")).await.unwrap();
        dir.create(project("dup", "TWO")).await.unwrap();

        let hit = dir.find_by_handle("dup").await.unwrap().unwrap();
        assert_eq!(hit.id, first.id);
    }

    #[tokio::test]
    async fn directory_list_honours_active_flag_and_delete() {
        let dir = MemoryProjectDirectory::new();
        let mut p = dir.create(project("one", "ONE")).await.unwrap();
        dir.create(project("two", "TWO")).await.unwrap();

        p.active = false;
        assert!(dir.update(&p).await.unwrap());

        assert_eq!(dir.list_all(false).await.unwrap().len(), 2);
        assert_eq!(dir.list_all(true).await.unwrap().len(), 1);

        assert!(dir.delete(&p.id).await.unwrap());
        assert!(!dir.delete(&p.id).await.unwrap());
        assert_eq!(dir.list_all(false).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn post_store_queries_return_newest_first() {
        let store = MemoryPostStore::new();
        store
            .insert(post("t1", "p1", 30, ImpactLevel::Bullish))
            .await
            .unwrap();
        store
            .insert(post("t2", "p1", 10, ImpactLevel::NonSignificant))
            .await
            .unwrap();
        store
            .insert(post("t3", "p2", 20, ImpactLevel::Bullish))
            .await
            .unwrap();

        let recent = store.find_recent(10).await.unwrap();
        assert_eq!(
            recent.iter().map(|p| p.tweet_id.as_str()).collect::<Vec<_>>(),
            vec!["t2", "t3", "t1"]
        );

        let for_p1 = store.find_by_project("p1", 10).await.unwrap();
        assert_eq!(for_p1.len(), 2);
        assert_eq!(for_p1[0].tweet_id, "t2");

        let bullish = store
            .find_by_impact_level(ImpactLevel::Bullish, 10)
            .await
            .unwrap();
        assert_eq!(bullish.len(), 2);
        assert_eq!(bullish[0].tweet_id, "t3");

        let limited = store.find_recent(1).await.unwrap();
        assert_eq!(limited.len(), 1);
    }

    #[tokio::test]
    async fn post_store_lookup_by_ids() {
        let store = MemoryPostStore::new();
        let id = store
            .insert(post("t9", "p1", 0, ImpactLevel::Bearish))
            .await
            .unwrap();

        let by_id = store.find_by_id(&id).await.unwrap().unwrap();
        assert_eq!(by_id.tweet_id, "t9");

        let by_ext = store.find_by_external_id("t9").await.unwrap().unwrap();
        assert_eq!(by_ext.id.as_deref(), Some(id.as_str()));

        assert!(store.find_by_external_id("missing").await.unwrap().is_none());
    }
}
