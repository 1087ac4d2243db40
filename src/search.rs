pub mod card;
pub mod controls;
pub mod selection;

use leptos::logging::log;
use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::errors::SearchError;
use crate::http::HttpClient;
use crate::inflight::{RequestSlot, RequestToken};
use crate::key_bar::ApiKeyBar;
use crate::nps::{self, ParkRecord, ParksRequest, ResourceKind, SearchQuery};
use crate::state::GlobalState;
use card::ResultCard;
use controls::SearchControls;
use selection::{NpsContext, Selection};

/// State of the search panel: the latest results, the picked records and
/// the in-flight request, if any.
#[derive(Debug, Default)]
pub struct SearchSession {
    results: Vec<ParkRecord>,
    results_kind: ResourceKind,
    selection: Selection,
    error: Option<SearchError>,
    slot: RequestSlot,
}

/// A search admitted by [`SearchSession::begin`], to be run and then passed to `finish`.
#[derive(Debug)]
pub struct PendingSearch {
    pub token: RequestToken,
    pub request: ParksRequest,
}

impl SearchSession {
    /// Starts a search. `Ok(None)` while another one is running.
    ///
    /// Results, selection and error are reset before the key is checked, so
    /// the caller should re-emit [`Self::context`] unless this returned `Ok(None)`.
    pub fn begin(
        &mut self,
        query: &SearchQuery,
        endpoint: &str,
        api_key: &str,
    ) -> Result<Option<PendingSearch>, SearchError> {
        if self.slot.is_busy() {
            log!("[WARN] [Search] Search already in progress, ignoring");
            return Ok(None);
        }
        self.results.clear();
        self.selection.clear();
        self.error = None;
        self.results_kind = query.resource;

        if api_key.trim().is_empty() {
            self.error = Some(SearchError::Auth);
            return Err(SearchError::Auth);
        }

        let Some(token) = self.slot.try_begin() else {
            return Ok(None);
        };
        log!(
            "[INFO] [Search] #{} {} '{}'",
            token.id(),
            query.resource,
            query.keyword.trim()
        );
        Ok(Some(PendingSearch {
            token,
            request: query.to_request(endpoint, api_key),
        }))
    }

    /// Applies the outcome of request `id`. Stale outcomes are dropped.
    pub fn finish(&mut self, id: u64, outcome: Result<Vec<ParkRecord>, SearchError>) -> bool {
        if !self.slot.finish(id) {
            return false;
        }
        match outcome {
            Ok(records) => self.results = records,
            Err(SearchError::Aborted) => {}
            Err(e) => {
                log!("[WARN] [Search] #{} failed: {}", id, e);
                self.error = Some(e);
            }
        }
        true
    }

    pub fn abort(&mut self) -> bool {
        self.slot.abort()
    }

    /// Adds the record to the selection and returns the new context.
    pub fn select(&mut self, record: ParkRecord) -> NpsContext {
        if !self.selection.add(record) {
            log!("[DEBUG] [Search] Record already selected");
        }
        self.context()
    }

    pub fn clear_selection(&mut self) -> NpsContext {
        self.selection.clear();
        self.context()
    }

    pub fn context(&self) -> NpsContext {
        NpsContext::snapshot(self.results_kind, &self.selection)
    }

    pub fn results(&self) -> &[ParkRecord] {
        &self.results
    }

    pub fn results_kind(&self) -> ResourceKind {
        self.results_kind
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn error(&self) -> Option<&SearchError> {
        self.error.as_ref()
    }

    pub fn is_busy(&self) -> bool {
        self.slot.is_busy()
    }
}

/// Runs an admitted search to completion (or abort).
pub async fn run_search<T: nps::ParksTransport>(
    transport: &T,
    pending: PendingSearch,
) -> (u64, Result<Vec<ParkRecord>, SearchError>) {
    let id = pending.token.id();
    let request = pending.request;
    let outcome = pending
        .token
        .run(nps::fetch_records(transport, &request))
        .await
        .unwrap_or(Err(SearchError::Aborted));
    (id, outcome)
}

#[component]
pub fn NpsSearch(#[prop(into)] on_context: Callback<NpsContext>) -> impl IntoView {
    let state = use_context::<GlobalState>().expect("GlobalState context not found");
    let config = state.config.clone();
    let key_slot = state.nps_key();

    let api_key = RwSignal::new(key_slot.load());
    let keyword = RwSignal::new(config.default_keyword.clone());
    let resource = RwSignal::new(ResourceKind::Parks);
    let state_code = RwSignal::new(String::new());
    let park_code = RwSignal::new(String::new());
    let limit = RwSignal::new(config.default_limit);

    let session = RwSignal::new(SearchSession::default());
    let busy = Signal::derive(move || session.with(|s| s.is_busy()));

    on_cleanup(move || {
        session.try_update(|s| s.abort());
    });

    let on_key_change = {
        let key_slot = key_slot.clone();
        Callback::new(move |value: String| key_slot.update(&value, true))
    };
    let on_key_clear = Callback::new(move |_: ()| key_slot.clear());

    let endpoint = config.parks_endpoint.clone();
    let on_fetch = Callback::new(move |_: ()| {
        let query = SearchQuery {
            keyword: keyword.get_untracked(),
            resource: resource.get_untracked(),
            state_code: state_code.get_untracked(),
            park_code: park_code.get_untracked(),
            limit: limit.get_untracked(),
        };
        let key = api_key.get_untracked();
        let Some(started) = session.try_update(|s| s.begin(&query, &endpoint, &key)) else {
            return;
        };
        let pending = match started {
            Ok(Some(pending)) => pending,
            Ok(None) => return,
            Err(e) => {
                log!("[WARN] [Search] {}", e);
                on_context.run(NpsContext::default());
                return;
            }
        };
        on_context.run(NpsContext::default());

        spawn_local(async move {
            let client = HttpClient::new();
            let (id, outcome) = run_search(&client, pending).await;
            session.try_update(|s| s.finish(id, outcome));
        });
    });

    let on_select = Callback::new(move |record: ParkRecord| {
        if let Some(context) = session.try_update(|s| s.select(record)) {
            on_context.run(context);
        }
    });

    let on_clear_selection = Callback::new(move |_: ()| {
        if let Some(context) = session.try_update(|s| s.clear_selection()) {
            on_context.run(context);
        }
    });

    let shown_results = config.shown_results;
    let max_limit = config.max_limit;

    view! {
        <nps-search>
            <section class="title-block">
                <h1>"Discover America's National Parks"</h1>
                <p>"Search and explore parks, campgrounds, and visitor centers"</p>
            </section>
            <ApiKeyBar
                value=api_key
                placeholder="Enter your NPS API key (stored locally)"
                on_change=on_key_change
                on_clear=on_key_clear
            />
            <SearchControls
                keyword=keyword
                resource=resource
                state_code=state_code
                park_code=park_code
                limit=limit
                max_limit=max_limit
                busy=busy
                can_fetch=Signal::derive(move || !api_key.get().is_empty())
                on_fetch=on_fetch
            />
            {move || {
                session
                    .with(|s| s.error().map(ToString::to_string))
                    .map(|error| view! { <error-box>"⚠ " {error}</error-box> })
            }}
            <section class="result-grid">
                {move || {
                    let (records, kind) = session
                        .with(|s| {
                            (
                                s.results().iter().take(shown_results).cloned().collect::<Vec<_>>(),
                                s.results_kind(),
                            )
                        });
                    records
                        .into_iter()
                        .map(|record| {
                            view! { <ResultCard record=record kind=kind on_select=on_select /> }
                        })
                        .collect_view()
                }}
            </section>
            <SelectionBar session=session on_clear=on_clear_selection />
        </nps-search>
    }
}

#[component]
fn SelectionBar(session: RwSignal<SearchSession>, on_clear: Callback<()>) -> impl IntoView {
    let count = Memo::new(move |_| session.with(|s| s.selection().len()));
    let names = Memo::new(move |_| session.with(|s| s.selection().names().join(", ")));
    view! {
        <selection-bar>
            <div>
                "Selected: "
                {move || match count.get() {
                    0 => "none yet".to_string(),
                    n => format!("{n} · {}", names.get()),
                }}
            </div>
            <Show when=move || { count.get() > 0 }>
                <button type="button" data-size="compact" on:click=move |_| on_clear.run(())>
                    "Clear"
                </button>
            </Show>
        </selection-bar>
    }
}
