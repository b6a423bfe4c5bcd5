//! The controller: owns the page state, turns events into state changes,
//! and spawns the async work whose results come back as events.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{debug, error, info};

use crate::api::Backend;
use crate::chain::WalletEnvironment;
use crate::config::Config;
use crate::events::{Event, ScrollMetrics};
use crate::state::{ActionKey, InFlight, PageOutcome, Ticket, UiState};
use crate::view::{self, View};
use crate::workflow::{self, ConnectOutcome};

const DISCONNECT_NOTICE_MS: u64 = 2000;
const CHANNEL_CAPACITY: usize = 100;

pub struct App {
    config: Arc<Config>,
    backend: Arc<dyn Backend>,
    env: Arc<dyn WalletEnvironment>,
    state: UiState,
    in_flight: InFlight,
    /// Bumped by disconnect; connects started before it are discarded.
    session_epoch: u64,
    tx: mpsc::Sender<Event>,
}

impl App {
    pub fn new(
        config: Config,
        backend: Arc<dyn Backend>,
        env: Arc<dyn WalletEnvironment>,
    ) -> (Self, mpsc::Receiver<Event>) {
        let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
        let app = Self {
            config: Arc::new(config),
            backend,
            env,
            state: UiState::new(),
            in_flight: InFlight::new(),
            session_epoch: 0,
            tx,
        };
        (app, rx)
    }

    /// Where user input and timers should send their events.
    pub fn sender(&self) -> mpsc::Sender<Event> {
        self.tx.clone()
    }

    pub fn state(&self) -> &UiState {
        &self.state
    }

    pub fn view(&self) -> View {
        view::render(&self.state, &self.config, &self.in_flight)
    }

    pub fn take_alerts(&mut self) -> Vec<String> {
        self.state.take_alerts()
    }

    /// Apply one event. Returns false once the app should stop.
    pub fn handle(&mut self, event: Event) -> bool {
        match event {
            Event::Connect => self.start_connect(),
            Event::Disconnect => self.disconnect(),
            Event::Scroll(metrics) => self.on_scroll(metrics),
            Event::LoadMore => self.load_page(),
            Event::PriceInput { token_id, value } => {
                self.state.price_inputs.insert(token_id, value);
            }
            Event::List { token_id } => self.start_list(token_id),
            Event::Buy { token_id } => self.start_buy(token_id),

            Event::Connected {
                ticket,
                epoch,
                result,
            } => {
                self.in_flight.finish(&ticket);
                if epoch != self.session_epoch {
                    info!("[wallet] Dropped connect that finished after disconnect");
                    return true;
                }
                match result {
                    Ok(ConnectOutcome::Connected(session)) => {
                        let short = session.short_address();
                        self.state.session = Some(session);
                        self.notify(format!("Connected {}", short));
                        self.load_page();
                    }
                    Ok(ConnectOutcome::ChainAdded) => {
                        self.notify(format!("{} added, connect again", self.config.chain.name));
                    }
                    Err(e) => {
                        error!("[wallet] Connect failed: {}", e);
                        self.state.alert(format!("Wallet connect failed: {}", e));
                    }
                }
            }
            Event::CatalogFetched {
                ticket,
                generation,
                result,
            } => {
                self.in_flight.finish(&ticket);
                match result {
                    Ok(entries) => {
                        let count = entries.len();
                        if self.state.catalog.install(generation, entries) {
                            info!("[catalog] Loaded {} NFTs", count);
                            self.render_next_page();
                        } else {
                            debug!("[catalog] Dropped fetch from generation {}", generation);
                            // The reset that outdated it may have been refused while it ran.
                            self.load_page();
                        }
                    }
                    Err(e) => error!("[catalog] Fetch failed: {}", e),
                }
            }
            Event::Listed { ticket, result } => {
                self.in_flight.finish(&ticket);
                let token_id = ticket_token(&ticket);
                match result {
                    Ok(receipt) => {
                        self.state
                            .price_overrides
                            .insert(receipt.token_id.clone(), receipt.price.to_ether_string());
                        self.state.price_inputs.remove(&receipt.token_id);
                        self.notify(format!(
                            "Listed #{} for {} {}",
                            receipt.token_id, receipt.price, self.config.chain.currency_symbol
                        ));
                        self.schedule_reload();
                    }
                    Err(e) => {
                        error!("[list] #{} failed: {}", token_id, e);
                        self.state.alert(format!("Listing #{} failed: {}", token_id, e));
                    }
                }
            }
            Event::Bought { ticket, result } => {
                self.in_flight.finish(&ticket);
                let token_id = ticket_token(&ticket);
                match result {
                    Ok(receipt) if receipt.recorded => {
                        self.notify(format!("Bought #{}", receipt.token_id));
                        self.schedule_reload();
                    }
                    Ok(receipt) => {
                        self.state.alert(format!(
                            "Bought #{} in {}, but the marketplace did not record the sale",
                            receipt.token_id, receipt.tx_hash
                        ));
                        self.schedule_reload();
                    }
                    Err(e) => {
                        error!("[buy] #{} failed: {}", token_id, e);
                        self.state.alert(format!("Purchase of #{} failed: {}", token_id, e));
                    }
                }
            }

            Event::Progress(text) => self.notify(text),
            Event::ClearNotice { id } => {
                self.state.clear_notice(id);
            }
            Event::ReloadCatalog => {
                if self.state.is_connected() {
                    self.state.reset_catalog();
                    self.load_page();
                }
            }
            Event::Shutdown => return false,
        }
        true
    }

    fn notify(&mut self, text: impl Into<String>) {
        let timeout = self.config.general.notice_timeout_ms;
        self.notify_for(text, timeout);
    }

    /// Show a notice and clear it after `ms`, unless a newer one replaced it.
    fn notify_for(&mut self, text: impl Into<String>, ms: u64) {
        let id = self.state.notify(text);
        self.send_after(Duration::from_millis(ms), Event::ClearNotice { id });
    }

    fn send_after(&self, delay: Duration, event: Event) {
        let tx = self.tx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = tx.send(event).await;
        });
    }

    fn busy(&mut self, what: &str) {
        self.notify(format!("{} is already in progress", what));
    }

    fn start_connect(&mut self) {
        if self.state.is_connected() {
            return;
        }
        let Some(ticket) = self.in_flight.begin(ActionKey::Connect) else {
            self.busy("Connecting");
            return;
        };

        let epoch = self.session_epoch;
        let env = self.env.clone();
        let config = self.config.clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = workflow::connect(env.as_ref(), &config).await;
            let _ = tx
                .send(Event::Connected {
                    ticket,
                    epoch,
                    result,
                })
                .await;
        });
    }

    fn disconnect(&mut self) {
        self.session_epoch += 1;
        self.state.disconnect();
        info!("[wallet] Disconnected");
        self.notify_for("Wallet disconnected", DISCONNECT_NOTICE_MS);
    }

    fn on_scroll(&mut self, metrics: ScrollMetrics) {
        if metrics.near_bottom(self.config.catalog.scroll_threshold_px) {
            self.load_page();
        }
    }

    /// Show the next page, fetching the catalog first if nothing is cached.
    fn load_page(&mut self) {
        if !self.state.is_connected() {
            return;
        }
        if !self.state.catalog.needs_fetch() {
            self.render_next_page();
            return;
        }
        // A fetch is already running; it renders the first page when it lands.
        let Some(ticket) = self.in_flight.begin(ActionKey::Catalog) else {
            return;
        };

        let generation = self.state.catalog.generation();
        let backend = self.backend.clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = backend.fetch_catalog().await;
            let _ = tx
                .send(Event::CatalogFetched {
                    ticket,
                    generation,
                    result,
                })
                .await;
        });
    }

    fn render_next_page(&mut self) {
        match self.state.catalog.next_page(self.config.catalog.batch_size) {
            PageOutcome::Rendered { start, end } => {
                debug!("[catalog] Rendered {}..{} of {}", start, end, self.state.catalog.total())
            }
            PageOutcome::Empty => info!("[catalog] Nothing to show"),
            PageOutcome::Exhausted => {}
        }
    }

    fn schedule_reload(&self) {
        let delay = Duration::from_millis(self.config.catalog.reload_delay_ms);
        self.send_after(delay, Event::ReloadCatalog);
    }

    /// Forwards workflow progress into the channel as notices.
    fn progress_sink(&self) -> impl Fn(&str) + Send + Sync + 'static {
        let tx = self.tx.clone();
        move |text: &str| {
            let _ = tx.try_send(Event::Progress(text.to_string()));
        }
    }

    fn start_list(&mut self, token_id: String) {
        let Some(ticket) = self.in_flight.begin(ActionKey::List(token_id.clone())) else {
            self.busy(&format!("Listing #{}", token_id));
            return;
        };

        let price = self
            .state
            .price_inputs
            .get(&token_id)
            .cloned()
            .unwrap_or_default();
        let session = self.state.session.clone();
        let backend = self.backend.clone();
        let config = self.config.clone();
        let progress = self.progress_sink();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = workflow::list_nft(
                session.as_ref(),
                backend.as_ref(),
                &config,
                &token_id,
                &price,
                &progress,
            )
            .await;
            let _ = tx.send(Event::Listed { ticket, result }).await;
        });
    }

    fn start_buy(&mut self, token_id: String) {
        let Some(entry) = self.state.catalog.find_rendered(&token_id).cloned() else {
            self.state.alert(format!("NFT #{} is not on the page", token_id));
            return;
        };
        let Some(ticket) = self.in_flight.begin(ActionKey::Buy(token_id.clone())) else {
            self.busy(&format!("Buying #{}", token_id));
            return;
        };

        let session = self.state.session.clone();
        let backend = self.backend.clone();
        let config = self.config.clone();
        let progress = self.progress_sink();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = workflow::buy_nft(
                session.as_ref(),
                backend.as_ref(),
                &config,
                &entry,
                &progress,
            )
            .await;
            let _ = tx.send(Event::Bought { ticket, result }).await;
        });
    }
}

fn ticket_token(ticket: &Ticket) -> &str {
    match &ticket.key {
        ActionKey::List(id) | ActionKey::Buy(id) => id,
        ActionKey::Connect | ActionKey::Catalog => "",
    }
}
