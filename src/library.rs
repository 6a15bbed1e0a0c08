//! Library state container
//!
//! [`LibraryState`] is what a front end renders: the loaded stories, whether
//! a load is in flight, and the last error message. It only changes through
//! [`LibraryState::apply`], and the events come from the operations on
//! [`Library`].

use crate::error::Result;
use crate::storage::StoryStore;
use crate::story::{Story, StoryId};
use futures::future::join_all;

/// Renderable view of the story collection
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LibraryState {
    /// Stories, newest first
    pub stories: Vec<Story>,
    /// A list request is in flight
    pub is_loading: bool,
    /// Message of the most recent failure, cleared by the next success
    pub error: Option<String>,
}

/// Something that happened to the collection
#[derive(Debug, Clone, PartialEq)]
pub enum LibraryEvent {
    LoadStarted,
    Loaded(Vec<Story>),
    LoadFailed(String),
    Saved(Story),
    SaveFailed(String),
    Deleted(Vec<StoryId>),
    DeleteFailed(String),
}

impl LibraryState {
    /// Fold one event into the state
    ///
    /// # Examples
    ///
    /// ```
    /// use bedtime_stories::library::{LibraryEvent, LibraryState};
    /// use bedtime_stories::story::Story;
    ///
    /// let mut state = LibraryState::default();
    /// state.apply(LibraryEvent::LoadStarted);
    /// assert!(state.is_loading);
    ///
    /// state.apply(LibraryEvent::Loaded(vec![Story::sample()]));
    /// assert!(!state.is_loading);
    /// assert_eq!(state.stories.len(), 1);
    /// ```
    pub fn apply(&mut self, event: LibraryEvent) {
        match event {
            LibraryEvent::LoadStarted => {
                self.is_loading = true;
            }
            LibraryEvent::Loaded(stories) => {
                self.stories = stories;
                self.is_loading = false;
                self.error = None;
            }
            LibraryEvent::LoadFailed(message) => {
                self.is_loading = false;
                self.error = Some(message);
            }
            LibraryEvent::Saved(story) => {
                self.stories.retain(|s| s.id != story.id);
                self.stories.insert(0, story);
                self.error = None;
            }
            LibraryEvent::Deleted(ids) => {
                self.stories.retain(|s| !ids.contains(&s.id));
            }
            LibraryEvent::SaveFailed(message) | LibraryEvent::DeleteFailed(message) => {
                self.error = Some(message);
            }
        }
    }

    /// Find a loaded story by id
    pub fn get(&self, id: &StoryId) -> Option<&Story> {
        self.stories.iter().find(|s| &s.id == id)
    }
}

/// Story collection backed by a store
///
/// Every operation talks to the store once per story and records the
/// outcome as events; errors are also returned to the caller.
pub struct Library {
    store: Box<dyn StoryStore>,
    state: LibraryState,
}

impl Library {
    pub fn new(store: Box<dyn StoryStore>) -> Self {
        Self {
            store,
            state: LibraryState::default(),
        }
    }

    pub fn state(&self) -> &LibraryState {
        &self.state
    }

    pub fn store(&self) -> &dyn StoryStore {
        self.store.as_ref()
    }

    /// Reload every story from the store
    ///
    /// # Errors
    ///
    /// Returns the store's error; the state keeps the previous stories and
    /// records the message.
    pub async fn refresh(&mut self) -> Result<&[Story]> {
        self.state.apply(LibraryEvent::LoadStarted);
        match self.store.list_all().await {
            Ok(stories) => {
                tracing::debug!(
                    "Loaded {} stories from {}",
                    stories.len(),
                    self.store.backend_name()
                );
                self.state.apply(LibraryEvent::Loaded(stories));
                Ok(&self.state.stories)
            }
            Err(e) => {
                self.state.apply(LibraryEvent::LoadFailed(e.to_string()));
                Err(e)
            }
        }
    }

    /// Persist a story and put it at the top of the list
    ///
    /// # Errors
    ///
    /// Returns the store's error; the story is not added to the state.
    pub async fn save(&mut self, story: Story) -> Result<()> {
        match self.store.save(&story).await {
            Ok(()) => {
                tracing::info!(id = %story.id, "Saved story \"{}\"", story.title);
                self.state.apply(LibraryEvent::Saved(story));
                Ok(())
            }
            Err(e) => {
                self.state.apply(LibraryEvent::SaveFailed(e.to_string()));
                Err(e)
            }
        }
    }

    /// Delete several stories, one concurrent request each
    ///
    /// Stories whose request succeeded leave the state even when others
    /// fail.
    ///
    /// # Returns
    ///
    /// The ids that were deleted, in request order
    ///
    /// # Errors
    ///
    /// Returns the first failure, in request order
    pub async fn delete_many(&mut self, stories: &[Story]) -> Result<Vec<StoryId>> {
        let store = self.store.as_ref();
        let results = join_all(stories.iter().map(|story| store.delete(story))).await;

        let mut deleted = Vec::new();
        let mut first_error = None;
        for (story, result) in stories.iter().zip(results) {
            match result {
                Ok(()) => {
                    tracing::info!(id = %story.id, "Deleted story");
                    deleted.push(story.id.clone());
                }
                Err(e) => {
                    tracing::error!(id = %story.id, "Failed to delete story: {}", e);
                    if first_error.is_none() {
                        first_error = Some(e);
                    }
                }
            }
        }

        self.state.apply(LibraryEvent::Deleted(deleted.clone()));
        match first_error {
            Some(e) => {
                self.state.apply(LibraryEvent::DeleteFailed(e.to_string()));
                Err(e)
            }
            None => Ok(deleted),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BedtimeError;
    use crate::story::ReadingDuration;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// In-memory store; deletes of ids in `failing` return an error
    #[derive(Default)]
    struct MemoryStore {
        stories: Mutex<Vec<Story>>,
        failing: Vec<StoryId>,
        fail_list: bool,
    }

    #[async_trait]
    impl StoryStore for MemoryStore {
        async fn save(&self, story: &Story) -> Result<()> {
            let mut stories = self.stories.lock().unwrap();
            stories.retain(|s| s.id != story.id);
            stories.push(story.clone());
            Ok(())
        }

        async fn list_all(&self) -> Result<Vec<Story>> {
            if self.fail_list {
                return Err(BedtimeError::Store("offline".to_string()).into());
            }
            let mut stories = self.stories.lock().unwrap().clone();
            stories.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            Ok(stories)
        }

        async fn delete(&self, story: &Story) -> Result<()> {
            if self.failing.contains(&story.id) {
                return Err(BedtimeError::Store(format!("cannot delete {}", story.id)).into());
            }
            self.stories.lock().unwrap().retain(|s| s.id != story.id);
            Ok(())
        }

        fn backend_name(&self) -> &'static str {
            "memory"
        }
    }

    fn story(title: &str) -> Story {
        Story::new(title, None, ReadingDuration::Ten, None, None).unwrap()
    }

    #[tokio::test]
    async fn test_save_puts_story_first() {
        let mut library = Library::new(Box::<MemoryStore>::default());
        library.save(story("First")).await.unwrap();
        library.save(story("Second")).await.unwrap();

        let titles: Vec<&str> = library
            .state()
            .stories
            .iter()
            .map(|s| s.title.as_str())
            .collect();
        assert_eq!(titles, vec!["Second", "First"]);
    }

    #[tokio::test]
    async fn test_save_same_id_replaces() {
        let mut library = Library::new(Box::<MemoryStore>::default());
        let mut original = story("Draft");
        library.save(original.clone()).await.unwrap();

        original.title = "Final".to_string();
        library.save(original.clone()).await.unwrap();

        assert_eq!(library.state().stories.len(), 1);
        assert_eq!(library.state().get(&original.id).unwrap().title, "Final");
    }

    #[tokio::test]
    async fn test_refresh_loads_from_store() {
        let store = MemoryStore::default();
        store.stories.lock().unwrap().push(story("Stored"));
        let mut library = Library::new(Box::new(store));

        let stories = library.refresh().await.unwrap();
        assert_eq!(stories.len(), 1);
        assert!(!library.state().is_loading);
        assert!(library.state().error.is_none());
    }

    #[tokio::test]
    async fn test_refresh_failure_records_error() {
        let store = MemoryStore {
            fail_list: true,
            ..Default::default()
        };
        let mut library = Library::new(Box::new(store));

        assert!(library.refresh().await.is_err());
        assert!(!library.state().is_loading);
        assert!(library.state().error.as_deref().unwrap().contains("offline"));
    }

    #[tokio::test]
    async fn test_delete_many_partial_failure() {
        let keep = story("Keep");
        let gone = story("Gone");
        let store = MemoryStore {
            failing: vec![keep.id.clone()],
            ..Default::default()
        };
        let mut library = Library::new(Box::new(store));
        library.save(keep.clone()).await.unwrap();
        library.save(gone.clone()).await.unwrap();

        let result = library.delete_many(&[keep.clone(), gone.clone()]).await;
        assert!(result.is_err());

        let state = library.state();
        assert!(state.get(&gone.id).is_none());
        assert!(state.get(&keep.id).is_some());
        assert!(state.error.is_some());
    }

    #[tokio::test]
    async fn test_delete_many_returns_deleted_ids() {
        let a = story("A");
        let b = story("B");
        let mut library = Library::new(Box::<MemoryStore>::default());
        library.save(a.clone()).await.unwrap();
        library.save(b.clone()).await.unwrap();

        let deleted = library.delete_many(&[a.clone(), b.clone()]).await.unwrap();
        assert_eq!(deleted, vec![a.id, b.id]);
        assert!(library.state().stories.is_empty());
    }

    #[test]
    fn test_success_clears_error() {
        let mut state = LibraryState {
            error: Some("boom".to_string()),
            ..Default::default()
        };
        state.apply(LibraryEvent::Loaded(Vec::new()));
        assert!(state.error.is_none());
    }
}
