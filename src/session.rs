//! Application state and the controller that drives it.
//!
//! [`Session`] is the one place mutable state lives: the last query and its
//! results, the detail panel, favorites and the notification banner. It only
//! changes through the transition methods below, each of which runs to
//! completion under the controller's lock.
//!
//! Remote lookups are split into `begin_*` / `finish_*` halves so the lock is
//! released while the request is in flight. Every `begin_*` bumps a sequence
//! number; a `finish_*` carrying an older number is dropped, so a slow
//! response can never overwrite a newer search or selection.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use crate::error::{DetailError, SearchError};
use crate::favorites::{FavoritesEvent, FavoritesStore};
use crate::notify::{Notification, Notifier, Severity};
use crate::omdb::{self, MovieDetail, MovieSummary, OmdbApi};

pub const MSG_EMPTY_QUERY: &str = "Please enter a movie name";
pub const MSG_NO_RESULTS: &str = "No movies found!";
pub const MSG_SEARCH_FAILED: &str = "Error fetching movie details";
pub const MSG_DETAIL_FAILED: &str = "Error fetching detailed movie information";
pub const MSG_FAVORITE_ADDED: &str = "Added to favorites";
pub const MSG_FAVORITE_REMOVED: &str = "Removed from favorites";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetailView {
    Closed,
    Pending { imdb_id: String },
    Open(MovieDetail),
}

#[derive(Debug)]
pub struct Session {
    query: String,
    results: Vec<MovieSummary>,
    searching: bool,
    detail: DetailView,
    favorites: FavoritesStore,
    notifier: Notifier,
    search_seq: u64,
    detail_seq: u64,
}

/// Handle for an in-flight search, returned by [`Session::begin_search`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchTicket {
    pub seq: u64,
    pub query: String,
}

impl Session {
    pub fn new(favorites: FavoritesStore, notifier: Notifier) -> Self {
        Self {
            query: String::new(),
            results: Vec::new(),
            searching: false,
            detail: DetailView::Closed,
            favorites,
            notifier,
            search_seq: 0,
            detail_seq: 0,
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn results(&self) -> &[MovieSummary] {
        &self.results
    }

    pub fn is_searching(&self) -> bool {
        self.searching
    }

    pub fn detail(&self) -> &DetailView {
        &self.detail
    }

    pub fn favorites(&self) -> &FavoritesStore {
        &self.favorites
    }

    pub fn notification(&self, now: DateTime<Utc>) -> Option<&Notification> {
        self.notifier.current(now)
    }

    /// Starts a search, or warns and returns `None` for a blank query.
    pub fn begin_search(&mut self, query: &str, now: DateTime<Utc>) -> Option<SearchTicket> {
        let query = match omdb::normalize_query(query) {
            Ok(q) => q.to_string(),
            Err(_) => {
                self.notifier.notify(MSG_EMPTY_QUERY, Severity::Warning, now);
                return None;
            }
        };
        self.search_seq += 1;
        self.searching = true;
        self.query = query.clone();
        Some(SearchTicket {
            seq: self.search_seq,
            query,
        })
    }

    /// Applies a search outcome. Returns `false` if a newer search superseded it.
    pub fn finish_search(
        &mut self,
        seq: u64,
        outcome: Result<Vec<MovieSummary>, SearchError>,
        now: DateTime<Utc>,
    ) -> bool {
        if seq != self.search_seq {
            debug!(seq, latest = self.search_seq, "discarding stale search result");
            return false;
        }
        self.searching = false;
        match outcome {
            Ok(results) => {
                self.results = results;
            }
            Err(SearchError::NoResults { .. }) => {
                self.results.clear();
                self.notifier.notify(MSG_NO_RESULTS, Severity::Error, now);
            }
            Err(SearchError::EmptyQuery) => {
                self.notifier.notify(MSG_EMPTY_QUERY, Severity::Warning, now);
            }
            Err(SearchError::Transport(_)) => {
                self.notifier.notify(MSG_SEARCH_FAILED, Severity::Error, now);
            }
        }
        true
    }

    /// Moves the detail panel to `Pending`, superseding any earlier selection.
    pub fn begin_detail(&mut self, imdb_id: &str) -> u64 {
        self.detail_seq += 1;
        self.detail = DetailView::Pending {
            imdb_id: imdb_id.to_string(),
        };
        self.detail_seq
    }

    /// Applies a detail outcome. Returns `false` if it was superseded or closed.
    pub fn finish_detail(
        &mut self,
        seq: u64,
        outcome: Result<MovieDetail, DetailError>,
        now: DateTime<Utc>,
    ) -> bool {
        if seq != self.detail_seq {
            debug!(seq, latest = self.detail_seq, "discarding stale detail result");
            return false;
        }
        match outcome {
            Ok(detail) => {
                self.detail = DetailView::Open(detail);
            }
            Err(_) => {
                self.detail = DetailView::Closed;
                self.notifier.notify(MSG_DETAIL_FAILED, Severity::Error, now);
            }
        }
        true
    }

    /// Closes the panel; a detail request still in flight will be ignored.
    pub fn close_detail(&mut self) {
        self.detail_seq += 1;
        self.detail = DetailView::Closed;
    }

    pub fn toggle_favorite(&mut self, summary: &MovieSummary, now: DateTime<Utc>) -> FavoritesEvent {
        // The file write happens here, under the session lock: once the
        // notification below is visible the favorites file is up to date.
        let event = self.favorites.toggle(summary);
        match event {
            FavoritesEvent::Added => {
                self.notifier.notify(MSG_FAVORITE_ADDED, Severity::Success, now)
            }
            FavoritesEvent::Removed => {
                self.notifier
                    .notify(MSG_FAVORITE_REMOVED, Severity::Info, now)
            }
        }
        event
    }

    pub fn dismiss_notification(&mut self) {
        self.notifier.dismiss();
    }

    pub fn view(&self, now: DateTime<Utc>) -> SessionView {
        let card = |m: &MovieSummary| MovieCard::new(m, self.favorites.is_favorite(&m.imdb_id));
        let detail = match &self.detail {
            DetailView::Closed => DetailPanel::Closed,
            DetailView::Pending { imdb_id } => DetailPanel::Pending {
                imdb_id: imdb_id.clone(),
            },
            DetailView::Open(d) => DetailPanel::Open {
                imdb_id: d.summary.imdb_id.clone(),
                title: d.summary.title.clone(),
                year: omdb::display_text(&d.summary.year).to_string(),
                poster: d.summary.poster_url().to_string(),
                genre: omdb::display_text(&d.genre).to_string(),
                director: omdb::display_text(&d.director).to_string(),
                actors: omdb::display_text(&d.actors).to_string(),
                plot: omdb::display_text(&d.plot).to_string(),
                favorite: self.favorites.is_favorite(d.imdb_id()),
            },
        };
        SessionView {
            query: self.query.clone(),
            searching: self.searching,
            results: self.results.iter().map(card).collect(),
            detail,
            favorites: self.favorites.entries().iter().map(card).collect(),
            notification: self.notification(now).cloned(),
        }
    }
}

/// Render snapshot of the whole session.
#[derive(Debug, Clone, Serialize)]
pub struct SessionView {
    pub query: String,
    pub searching: bool,
    pub results: Vec<MovieCard>,
    pub detail: DetailPanel,
    pub favorites: Vec<MovieCard>,
    pub notification: Option<Notification>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MovieCard {
    pub imdb_id: String,
    pub title: String,
    pub year: String,
    pub poster: String,
    pub favorite: bool,
}

impl MovieCard {
    fn new(summary: &MovieSummary, favorite: bool) -> Self {
        Self {
            imdb_id: summary.imdb_id.clone(),
            title: summary.title.clone(),
            year: omdb::display_text(&summary.year).to_string(),
            poster: summary.poster_url().to_string(),
            favorite,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum DetailPanel {
    Closed,
    Pending {
        imdb_id: String,
    },
    Open {
        imdb_id: String,
        title: String,
        year: String,
        poster: String,
        genre: String,
        director: String,
        actors: String,
        plot: String,
        favorite: bool,
    },
}

#[derive(Clone)]
pub struct Controller {
    omdb: Arc<dyn OmdbApi>,
    session: Arc<Mutex<Session>>,
}

impl Controller {
    pub fn new(omdb: Arc<dyn OmdbApi>, session: Session) -> Self {
        Self {
            omdb,
            session: Arc::new(Mutex::new(session)),
        }
    }

    /// Runs a search to completion even if the caller stops waiting, so the
    /// session never stays marked as searching.
    pub async fn search(&self, query: &str) {
        let this = self.clone();
        let query = query.to_string();
        let task = tokio::spawn(async move { this.run_search(&query).await });
        if let Err(e) = task.await {
            error!("Search task aborted: {}", e);
        }
    }

    /// Runs a detail lookup to completion even if the caller stops waiting, so
    /// the panel never stays pending.
    pub async fn select(&self, imdb_id: &str) {
        let this = self.clone();
        let imdb_id = imdb_id.to_string();
        let task = tokio::spawn(async move { this.run_select(&imdb_id).await });
        if let Err(e) = task.await {
            error!("Detail task aborted: {}", e);
        }
    }

    async fn run_search(&self, query: &str) {
        let ticket = {
            let mut session = self.session.lock().await;
            session.begin_search(query, Utc::now())
        };
        let Some(ticket) = ticket else {
            info!("Ignoring blank search");
            return;
        };

        info!("Searching OMDb for '{}'", ticket.query);
        let outcome = self.omdb.search(&ticket.query).await;
        match &outcome {
            Ok(results) => info!("Search '{}' returned {} titles", ticket.query, results.len()),
            Err(SearchError::NoResults { message }) => {
                info!("Search '{}' matched nothing: {}", ticket.query, message)
            }
            Err(e) => warn!("Search '{}' failed: {}", ticket.query, e),
        }

        let mut session = self.session.lock().await;
        session.finish_search(ticket.seq, outcome, Utc::now());
    }

    async fn run_select(&self, imdb_id: &str) {
        let seq = self.session.lock().await.begin_detail(imdb_id);

        info!("Fetching details for {}", imdb_id);
        let outcome = self.omdb.fetch_detail(imdb_id).await;
        if let Err(e) = &outcome {
            warn!("Detail lookup for {} failed: {}", imdb_id, e);
        }

        let mut session = self.session.lock().await;
        session.finish_detail(seq, outcome, Utc::now());
    }

    pub async fn close_detail(&self) {
        self.session.lock().await.close_detail();
    }

    pub async fn toggle_favorite(&self, summary: &MovieSummary) -> FavoritesEvent {
        let event = self
            .session
            .lock()
            .await
            .toggle_favorite(summary, Utc::now());
        info!("Favorite {:?}: {} ({})", event, summary.title, summary.imdb_id);
        event
    }

    pub async fn dismiss_notification(&self) {
        self.session.lock().await.dismiss_notification();
    }

    pub async fn favorites(&self) -> Vec<MovieSummary> {
        self.session.lock().await.favorites().entries().to_vec()
    }

    pub async fn view(&self) -> SessionView {
        self.session.lock().await.view(Utc::now())
    }
}
