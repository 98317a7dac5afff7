//! The synchronization context: one owned object holding the mirror, the polling
//! tasks and their guards.
//!
//! Lifecycle is `new`, `mount`, `teardown`. Mounting registers the event, orientation
//! and catalogue polls with the scheduler; the settings value refresh is a fourth task
//! that only exists while a settings submenu is open. Every poll result goes through [`SyncContext::commit`],
//! which checks the liveness captured when the poll was issued, so nothing is
//! written once the context has been torn down.
//!
//! Everything runs on one [`tokio::task::LocalSet`].

use futures::future::join_all;
use std::cell::{Cell, Ref, RefCell};
use std::future::Future;
use std::rc::{Rc, Weak};
use std::time::Duration;

use crate::asset_cache::{AssetEntry, SelectionKey, FACT_TYPES};
use crate::config::PollingConfig;
use crate::error::{RemoteError, RenderError};
use crate::menu::{FrameTicket, MenuKind};
use crate::mirror::Mirror;
use crate::remote::RemoteClient;
use crate::render::{self, ViewNode};
use crate::scheduler::{Liveness, Scheduler, TaskHandle};
use crate::single_flight::{Flight, SingleFlight};
use crate::types::{AssetType, Event, TextType};

pub struct SyncContext {
    this: Weak<SyncContext>,
    client: RemoteClient,
    polling: PollingConfig,
    mirror: RefCell<Mirror>,
    scheduler: Scheduler,
    events: SingleFlight,
    catalogue: SingleFlight,
    values: SingleFlight,
    orientation_seq: Cell<u64>,
    value_refresh: RefCell<Option<(FrameTicket, TaskHandle)>>,
    mounted: Cell<bool>,
}

impl SyncContext {
    pub fn new(client: RemoteClient, polling: PollingConfig) -> Rc<Self> {
        Rc::new_cyclic(|this| SyncContext {
            this: this.clone(),
            client,
            polling,
            mirror: RefCell::new(Mirror::new()),
            scheduler: Scheduler::new(),
            events: SingleFlight::new("next_event"),
            catalogue: SingleFlight::new("catalogue"),
            values: SingleFlight::new("setting_values"),
            orientation_seq: Cell::new(0),
            value_refresh: RefCell::new(None),
            mounted: Cell::new(false),
        })
    }

    // ===================================
    // LIFECYCLE
    // ===================================

    /// Starts polling. Must be called from inside a `LocalSet`.
    pub fn mount(&self) {
        if !self.scheduler.is_running() {
            tracing::warn!("sync context was torn down, not mounting again");
            return;
        }
        if self.mounted.replace(true) {
            return;
        }

        tracing::info!(polling = ?self.polling, "sync started");
        self.every("next_event", self.polling.event_period(), |ctx, live| {
            ctx.poll_event(live)
        });
        self.every("orientation", self.polling.orientation_period(), |ctx, live| {
            ctx.poll_orientation(live)
        });
        self.every("catalogue", self.polling.catalogue_period(), |ctx, live| {
            ctx.poll_catalogue(live)
        });
    }

    /// Cancels every task and resets the mirror. Calls still in flight resolve into nothing.
    pub fn teardown(&self) {
        if !self.scheduler.is_running() {
            return;
        }
        self.stop_value_refresh();
        self.scheduler.shutdown();
        self.mirror.borrow_mut().reset();
        self.mounted.set(false);
        tracing::info!("sync stopped");
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted.get()
    }

    pub fn mirror(&self) -> Ref<'_, Mirror> {
        self.mirror.borrow()
    }

    pub fn render(&self) -> Result<ViewNode, RenderError> {
        render::render(&self.mirror.borrow())
    }

    /// Whether the settings values are currently being refreshed.
    pub fn is_refreshing_values(&self) -> bool {
        self.value_refresh
            .borrow()
            .as_ref()
            .is_some_and(|(_, handle)| !handle.is_cancelled())
    }

    // ===================================
    // PLUMBING
    // ===================================

    fn every<F, Fut>(&self, name: &'static str, period: Duration, op: F) -> TaskHandle
    where
        F: Fn(Rc<SyncContext>, Liveness) -> Fut + 'static,
        Fut: Future<Output = ()> + 'static,
    {
        let this = self.this.clone();
        self.scheduler.schedule(name, period, move |live| {
            let run = this.upgrade().map(|ctx| op(ctx, live));
            async move {
                if let Some(run) = run {
                    run.await;
                }
            }
        })
    }

    fn once<F, Fut>(&self, name: &'static str, op: F)
    where
        F: FnOnce(Rc<SyncContext>, Liveness) -> Fut,
        Fut: Future<Output = ()> + 'static,
    {
        if let Some(ctx) = self.this.upgrade() {
            self.scheduler.spawn_once(name, move |live| op(ctx, live));
        }
    }

    /// Applies `update` unless the task that produced the result was cancelled.
    fn commit<R>(&self, live: &Liveness, update: impl FnOnce(&mut Mirror) -> R) -> Option<R> {
        if !live.is_alive() {
            tracing::trace!("discarding result of a cancelled task");
            return None;
        }
        Some(update(&mut self.mirror.borrow_mut()))
    }

    // ===================================
    // POLLS
    // ===================================

    async fn poll_event(self: Rc<Self>, live: Liveness) {
        let flight = self.events.run(|| self.client.next_event()).await;
        let Flight::Landed(result) = flight else {
            return;
        };

        match result {
            Ok(Some(Event::Input(input))) => {
                tracing::debug!(?input, "input event");
                self.commit(&live, |mirror| mirror.record_input(input));
            }
            Ok(Some(Event::Other(tag))) => tracing::trace!(%tag, "ignoring event"),
            Ok(None) => {}
            Err(err) => tracing::debug!(%err, "event poll failed"),
        }
    }

    async fn poll_orientation(self: Rc<Self>, live: Liveness) {
        let seq = self.orientation_seq.get() + 1;
        self.orientation_seq.set(seq);

        let orientation = match self.client.current_orientation().await {
            Ok(orientation) => orientation,
            Err(err) => {
                tracing::debug!(%err, "orientation poll failed");
                return;
            }
        };

        let applied = self.commit(&live, |mirror| mirror.update_orientation(seq, orientation));
        if let Some(Some(change)) = applied {
            if change.left_submenu() {
                self.stop_value_refresh();
            }
            self.drive(&live);
        }
    }

    async fn poll_catalogue(self: Rc<Self>, live: Liveness) {
        let flight = self
            .catalogue
            .run(|| async { futures::join!(self.client.all_systems(), self.client.current_system()) })
            .await;
        let Flight::Landed((systems, current)) = flight else {
            return;
        };

        match systems {
            Ok(systems) => {
                self.commit(&live, |mirror| mirror.update_catalogue(systems));
            }
            Err(err) => tracing::debug!(%err, "catalogue poll failed"),
        }
        match current {
            Ok(system) => {
                self.commit(&live, |mirror| mirror.update_current_system(system));
            }
            Err(err) => tracing::debug!(%err, "current system poll failed"),
        }
        self.drive(&live);
    }

    /// Starts whatever secondary fetches the mirror now calls for.
    fn drive(&self, live: &Liveness) {
        if !live.is_alive() {
            return;
        }

        let stale_refresh = self
            .value_refresh
            .borrow()
            .as_ref()
            .is_some_and(|(ticket, _)| !self.mirror.borrow().menus.is_current(*ticket));
        if stale_refresh {
            self.stop_value_refresh();
        }

        let (pending, target) = {
            let mut mirror = self.mirror.borrow_mut();
            let pending = mirror.menus.take_pending();
            let selection = mirror.selected_game().and(mirror.selection());
            let target = selection.filter(|key| mirror.assets.ensure(*key));
            (pending, target)
        };

        for ticket in pending {
            self.once("menu", move |ctx, live| ctx.fetch_menu(ticket, live));
        }
        if let Some(key) = target {
            self.once("assets", move |ctx, live| ctx.fetch_assets(key, live));
        }
    }

    // ===================================
    // MENUS
    // ===================================

    async fn fetch_menu(self: Rc<Self>, ticket: FrameTicket, live: Liveness) {
        let fetched = match ticket.kind() {
            MenuKind::Top => self.fetch_top_menu(ticket, &live).await,
            MenuKind::Settings => self.fetch_settings(ticket, &live).await,
        };
        if let Err(err) = fetched {
            tracing::debug!(%err, kind = ?ticket.kind(), "menu fetch failed");
            self.commit(&live, |mirror| mirror.menus.mark_failed(ticket));
        }
    }

    async fn fetch_top_menu(&self, ticket: FrameTicket, live: &Liveness) -> Result<(), RemoteError> {
        let labels = self.client.menu().await?;
        self.commit(live, |mirror| mirror.menus.install_labels(ticket, labels));
        Ok(())
    }

    /// Labels, then types, then the value refresh. Stops early once the frame is gone.
    async fn fetch_settings(&self, ticket: FrameTicket, live: &Liveness) -> Result<(), RemoteError> {
        let labels = self.client.settings_menu().await?;
        if self.commit(live, |mirror| mirror.menus.install_labels(ticket, labels)) != Some(true) {
            return Ok(());
        }

        let types = self.client.setting_types().await?;
        if self.commit(live, |mirror| mirror.menus.install_types(ticket, types)) != Some(true) {
            return Ok(());
        }

        self.start_value_refresh(ticket);
        Ok(())
    }

    fn start_value_refresh(&self, ticket: FrameTicket) {
        self.stop_value_refresh();
        let handle = self.every("setting_values", self.polling.setting_values_period(), move |ctx, live| {
            ctx.refresh_values(ticket, live)
        });
        *self.value_refresh.borrow_mut() = Some((ticket, handle));
    }

    fn stop_value_refresh(&self) {
        if let Some((_, handle)) = self.value_refresh.borrow_mut().take() {
            handle.cancel();
            tracing::debug!("settings value refresh stopped");
        }
    }

    async fn refresh_values(self: Rc<Self>, ticket: FrameTicket, live: Liveness) {
        let flight = self
            .values
            .run(|| async {
                let Some(count) = self.mirror.borrow().menus.value_count(ticket) else {
                    return Vec::new();
                };
                let fetches = (0..count).map(|index| {
                    let client = &self.client;
                    async move { (index, client.setting_value(index).await) }
                });
                join_all(fetches).await
            })
            .await;
        let Flight::Landed(results) = flight else {
            return;
        };

        let mut values = Vec::with_capacity(results.len());
        for (index, result) in results {
            match result {
                Ok(value) => values.push((index, value)),
                Err(err) => tracing::debug!(%err, index, "setting value fetch failed"),
            }
        }
        self.commit(&live, |mirror| {
            for (index, value) in values {
                mirror.menus.install_value(ticket, index, value);
            }
        });
    }

    // ===================================
    // ASSETS
    // ===================================

    async fn fetch_assets(self: Rc<Self>, key: SelectionKey, live: Liveness) {
        let client = &self.client;
        let facts = join_all(FACT_TYPES.into_iter().map(move |text_type| async move {
            (text_type, client.current_text(text_type).await)
        }));
        let (image, description, facts) = futures::join!(
            client.current_asset(AssetType::Image),
            client.current_text(TextType::Description),
            facts
        );

        let mut failures = 0;
        let mut entry = AssetEntry::empty(key);
        entry.image = keep(image, &mut failures);
        entry.description = keep(description, &mut failures);
        for (text_type, result) in facts {
            if let Some(text) = keep(result, &mut failures) {
                entry.facts.push((text_type, text));
            }
        }

        if failures == FACT_TYPES.len() + 2 {
            tracing::debug!(?key, "asset fetch failed");
            self.commit(&live, |mirror| mirror.assets.abandon(key));
            return;
        }
        self.commit(&live, |mirror| mirror.assets.install(entry));
    }
}

// A failed field renders like an absent one.
fn keep<T>(result: Result<Option<T>, RemoteError>, failures: &mut usize) -> Option<T> {
    match result {
        Ok(value) => value,
        Err(err) => {
            tracing::trace!(%err, "asset field unavailable");
            *failures += 1;
            None
        }
    }
}
