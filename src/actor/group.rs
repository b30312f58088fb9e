//! ActorGroup: the set of actors making up one application.
//!
//! Workers are started in the order they were added and quit in reverse,
//! so an actor that feeds another is still running while its consumers
//! shut down.

use super::Actor;
use crate::error::ActorError;

/// Named collection of actors owned by the main thread.
pub struct ActorGroup<T: 'static> {
    actors: Vec<Box<dyn Actor<T>>>,
}

impl<T: 'static> Default for ActorGroup<T> {
    fn default() -> Self {
        Self { actors: Vec::new() }
    }
}

impl<T: 'static> std::fmt::Debug for ActorGroup<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActorGroup").field("actors", &self.names()).finish()
    }
}

impl<T: 'static> ActorGroup<T> {
    /// Create an empty group.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an actor.
    ///
    /// # Errors
    ///
    /// Returns [`ActorError::DuplicateName`] if an actor with the same name
    /// is already in the group; the new actor is dropped.
    pub fn add(&mut self, actor: impl Actor<T> + 'static) -> Result<(), ActorError> {
        if self.get(actor.name()).is_some() {
            return Err(ActorError::DuplicateName(actor.name().to_string()));
        }
        self.actors.push(Box::new(actor));
        Ok(())
    }

    /// Look up an actor by name.
    pub fn get(&self, name: &str) -> Option<&dyn Actor<T>> {
        self.actors
            .iter()
            .find(|actor| actor.name() == name)
            .map(|actor| &**actor)
    }

    /// Look up an actor by name, mutably.
    pub fn get_mut(&mut self, name: &str) -> Option<&mut (dyn Actor<T> + 'static)> {
        self.actors
            .iter_mut()
            .find(|actor| actor.name() == name)
            .map(|actor| &mut **actor)
    }

    /// Actor names in insertion order.
    pub fn names(&self) -> Vec<&str> {
        self.actors.iter().map(|actor| actor.name()).collect()
    }

    /// Number of actors.
    pub fn len(&self) -> usize {
        self.actors.len()
    }

    /// Whether the group is empty.
    pub fn is_empty(&self) -> bool {
        self.actors.is_empty()
    }

    /// Start every actor in insertion order.
    ///
    /// # Errors
    ///
    /// Stops at the first actor that fails to start and returns its error;
    /// actors started before it keep running.
    pub fn start_all(&mut self) -> Result<(), ActorError> {
        for actor in &mut self.actors {
            actor.start()?;
        }
        tracing::info!(actors = self.actors.len(), "actor group started");
        Ok(())
    }

    /// Quit every actor in reverse insertion order.
    ///
    /// Every actor is asked to stop even if an earlier one reported an error.
    ///
    /// # Errors
    ///
    /// Returns the first error reported.
    pub fn quit_all(&mut self) -> Result<(), ActorError> {
        let mut first = None;
        for actor in self.actors.iter_mut().rev() {
            if let Err(e) = actor.quit() {
                tracing::warn!(actor = actor.name(), error = %e, "actor ended with an error");
                first.get_or_insert(e);
            }
        }
        first.map_or(Ok(()), Err)
    }
}
