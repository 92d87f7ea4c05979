//! Movie and actor records, the stores that hold them and the collaborators
//! those stores talk to.
//!
//! The REST backend and the local cache are traits so the dashboard can run
//! against an in-memory API and a directory of JSON files.

use crate::error::CatalogError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

pub const MOVIE_STORE_KEY: &str = "movie-store";
pub const ACTOR_STORE_KEY: &str = "actor-store";

// ============================================================================
// RECORDS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Movie {
    /// Empty until the API assigns one.
    #[serde(default)]
    pub id: String,
    pub title: String,
    pub year: i32,
    pub studio: String,
    /// 0-10 stars.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<u8>,
    #[serde(default)]
    pub watched: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Actor {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub born: Option<i32>,
}

/// Counts shown on the dashboard tiles.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DashboardStats {
    pub total: usize,
    pub watched: usize,
    pub unwatched: usize,
}

impl DashboardStats {
    pub fn from_movies(movies: &[Movie]) -> Self {
        let watched = movies.iter().filter(|movie| movie.watched).count();
        Self {
            total: movies.len(),
            watched,
            unwatched: movies.len() - watched,
        }
    }

    /// Share of watched movies, 0 for an empty catalog.
    pub fn watched_percent(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.watched as f64 / self.total as f64 * 100.0
        }
    }

    /// Mean of the rated movies, if any are rated.
    pub fn average_rating(movies: &[Movie]) -> Option<f64> {
        let rated: Vec<f64> = movies
            .iter()
            .filter_map(|movie| movie.rating.map(f64::from))
            .collect();
        if rated.is_empty() {
            None
        } else {
            Some(rated.iter().sum::<f64>() / rated.len() as f64)
        }
    }
}

// ============================================================================
// COLLABORATORS
// ============================================================================

/// The `/api/movies` resource.
pub trait CatalogApi {
    fn list_movies(&mut self) -> Result<Vec<Movie>, CatalogError>;
    /// Returns the id the backend assigned.
    fn create_movie(&mut self, movie: &Movie) -> Result<String, CatalogError>;
    fn update_movie(&mut self, movie: &Movie) -> Result<(), CatalogError>;
    fn delete_movie(&mut self, id: &str) -> Result<(), CatalogError>;
}

/// Key-value cache for serialized store contents.
pub trait Persistence {
    fn load(&self, key: &str) -> Result<Option<String>, CatalogError>;
    fn save(&mut self, key: &str, json: &str) -> Result<(), CatalogError>;
}

/// Backend kept in process memory. Can be switched into a failing mode.
#[derive(Debug, Default)]
pub struct InMemoryApi {
    movies: Vec<Movie>,
    next_id: u64,
    offline: bool,
}

impl InMemoryApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_movies(movies: Vec<Movie>) -> Self {
        Self {
            next_id: movies.len() as u64,
            movies,
            offline: false,
        }
    }

    /// While offline every request fails with `CatalogError::Api`.
    pub fn set_offline(&mut self, offline: bool) {
        self.offline = offline;
    }

    fn check_online(&self) -> Result<(), CatalogError> {
        if self.offline {
            Err(CatalogError::Api("backend unreachable".to_string()))
        } else {
            Ok(())
        }
    }
}

impl CatalogApi for InMemoryApi {
    fn list_movies(&mut self) -> Result<Vec<Movie>, CatalogError> {
        self.check_online()?;
        Ok(self.movies.clone())
    }

    fn create_movie(&mut self, movie: &Movie) -> Result<String, CatalogError> {
        self.check_online()?;
        self.next_id += 1;
        let id = format!("m-{}", self.next_id);
        self.movies.push(Movie {
            id: id.clone(),
            ..movie.clone()
        });
        Ok(id)
    }

    fn update_movie(&mut self, movie: &Movie) -> Result<(), CatalogError> {
        self.check_online()?;
        let slot = self
            .movies
            .iter_mut()
            .find(|m| m.id == movie.id)
            .ok_or_else(|| CatalogError::NotFound(movie.id.clone()))?;
        *slot = movie.clone();
        Ok(())
    }

    fn delete_movie(&mut self, id: &str) -> Result<(), CatalogError> {
        self.check_online()?;
        let before = self.movies.len();
        self.movies.retain(|m| m.id != id);
        if self.movies.len() == before {
            return Err(CatalogError::NotFound(id.to_string()));
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct MemoryPersistence {
    entries: HashMap<String, String>,
}

impl MemoryPersistence {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Persistence for MemoryPersistence {
    fn load(&self, key: &str) -> Result<Option<String>, CatalogError> {
        Ok(self.entries.get(key).cloned())
    }

    fn save(&mut self, key: &str, json: &str) -> Result<(), CatalogError> {
        self.entries.insert(key.to_string(), json.to_string());
        Ok(())
    }
}

/// One `<key>.json` file per key inside `dir`.
#[derive(Debug, Clone)]
pub struct JsonFilePersistence {
    dir: PathBuf,
}

impl JsonFilePersistence {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl Persistence for JsonFilePersistence {
    fn load(&self, key: &str) -> Result<Option<String>, CatalogError> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(json) => Ok(Some(json)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn save(&mut self, key: &str, json: &str) -> Result<(), CatalogError> {
        fs::create_dir_all(&self.dir)?;
        fs::write(self.path_for(key), json)?;
        Ok(())
    }
}

// ============================================================================
// STORES
// ============================================================================

fn restore<T, P>(persistence: &P, key: &str) -> Result<Option<Vec<T>>, CatalogError>
where
    T: DeserializeOwned,
    P: Persistence,
{
    persistence
        .load(key)?
        .map(|json| serde_json::from_str(&json))
        .transpose()
        .map_err(CatalogError::from)
}

fn store<T: Serialize, P: Persistence>(persistence: &mut P, key: &str, items: &[T]) -> Result<(), CatalogError> {
    let json = serde_json::to_string(items)?;
    persistence.save(key, &json)
}

/// Movies mirrored from the API and cached locally.
///
/// Every method either succeeds and persists the new list, or fails and
/// leaves the list as it was. Nothing is retried.
pub struct MovieStore<A: CatalogApi, P: Persistence> {
    api: A,
    persistence: P,
    movies: Vec<Movie>,
}

impl<A: CatalogApi, P: Persistence> MovieStore<A, P> {
    pub fn new(api: A, persistence: P) -> Self {
        Self {
            api,
            persistence,
            movies: Vec::new(),
        }
    }

    pub fn movies(&self) -> &[Movie] {
        &self.movies
    }

    pub fn get(&self, id: &str) -> Option<&Movie> {
        self.movies.iter().find(|movie| movie.id == id)
    }

    pub fn stats(&self) -> DashboardStats {
        DashboardStats::from_movies(&self.movies)
    }

    pub fn api_mut(&mut self) -> &mut A {
        &mut self.api
    }

    /// Restore the cached list. Returns how many movies were restored.
    pub fn load(&mut self) -> Result<usize, CatalogError> {
        if let Some(movies) = restore(&self.persistence, MOVIE_STORE_KEY)? {
            self.movies = movies;
        }
        debug!(count = self.movies.len(), "movie cache restored");
        Ok(self.movies.len())
    }

    fn commit(&mut self, movies: Vec<Movie>) -> Result<(), CatalogError> {
        store(&mut self.persistence, MOVIE_STORE_KEY, &movies)?;
        self.movies = movies;
        Ok(())
    }

    fn logged<T>(action: &str, result: Result<T, CatalogError>) -> Result<T, CatalogError> {
        if let Err(err) = &result {
            warn!(%err, "failed to {action}");
        }
        result
    }

    /// Replace the local list with the backend's.
    pub fn fetch(&mut self) -> Result<(), CatalogError> {
        let movies = Self::logged("fetch movies", self.api.list_movies())?;
        info!(count = movies.len(), "movies fetched");
        Self::logged("persist movies", self.commit(movies))
    }

    /// Create `movie` on the backend and append it with the id it was given.
    pub fn add(&mut self, movie: Movie) -> Result<String, CatalogError> {
        let id = Self::logged("add movie", self.api.create_movie(&movie))?;
        let mut movies = self.movies.clone();
        movies.push(Movie { id: id.clone(), ..movie });
        Self::logged("persist movies", self.commit(movies))?;
        info!(%id, "movie added");
        Ok(id)
    }

    pub fn update(&mut self, updated: Movie) -> Result<(), CatalogError> {
        Self::logged("update movie", self.api.update_movie(&updated))?;
        let movies = self
            .movies
            .iter()
            .map(|movie| if movie.id == updated.id { updated.clone() } else { movie.clone() })
            .collect();
        Self::logged("persist movies", self.commit(movies))
    }

    pub fn remove(&mut self, id: &str) -> Result<(), CatalogError> {
        Self::logged("delete movie", self.api.delete_movie(id))?;
        let movies = self.movies.iter().filter(|movie| movie.id != id).cloned().collect();
        Self::logged("persist movies", self.commit(movies))
    }

    /// Bulk replace without touching the backend.
    pub fn set(&mut self, movies: Vec<Movie>) -> Result<(), CatalogError> {
        self.commit(movies)
    }
}

/// Actors kept locally only.
pub struct ActorStore<P: Persistence> {
    persistence: P,
    actors: Vec<Actor>,
}

impl<P: Persistence> ActorStore<P> {
    pub fn new(persistence: P) -> Self {
        Self {
            persistence,
            actors: Vec::new(),
        }
    }

    pub fn actors(&self) -> &[Actor] {
        &self.actors
    }

    pub fn load(&mut self) -> Result<usize, CatalogError> {
        if let Some(actors) = restore(&self.persistence, ACTOR_STORE_KEY)? {
            self.actors = actors;
        }
        Ok(self.actors.len())
    }

    fn commit(&mut self, actors: Vec<Actor>) -> Result<(), CatalogError> {
        store(&mut self.persistence, ACTOR_STORE_KEY, &actors)?;
        self.actors = actors;
        Ok(())
    }

    /// Returns `false` without changing anything if the id is already taken.
    pub fn add(&mut self, actor: Actor) -> Result<bool, CatalogError> {
        if self.actors.iter().any(|a| a.id == actor.id) {
            debug!(id = %actor.id, "duplicate actor ignored");
            return Ok(false);
        }
        let mut actors = self.actors.clone();
        actors.push(actor);
        self.commit(actors)?;
        Ok(true)
    }

    pub fn update(&mut self, updated: Actor) -> Result<(), CatalogError> {
        let actors = self
            .actors
            .iter()
            .map(|a| if a.id == updated.id { updated.clone() } else { a.clone() })
            .collect();
        self.commit(actors)
    }

    pub fn remove(&mut self, id: &str) -> Result<(), CatalogError> {
        let actors = self.actors.iter().filter(|a| a.id != id).cloned().collect();
        self.commit(actors)
    }

    pub fn set(&mut self, actors: Vec<Actor>) -> Result<(), CatalogError> {
        self.commit(actors)
    }
}
