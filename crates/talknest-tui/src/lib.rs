use std::io;
use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use talknest_core::{
    CustomScenarioInput, EndGuard, PracticeSession, RoleplayClient, CUSTOM_CHILD_STATES,
    MAX_DESCRIPTION_CHARS,
};
use talknest_memory::HistoryStore;
use talknest_schema::{catalog, Message, PracticeRecord, ReportData, Scenario};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::warn;

mod ui;

const HOME_RECENT_RECORDS: usize = 3;
const CAROUSEL_INTERVAL: Duration = Duration::from_secs(5);

const NOTICE_REPLY_FAILED: &str = "回复生成失败，请重试。";
const NOTICE_REPORT_FAILED: &str = "生成报告失败，请重试。";
const NOTICE_DRAFT_FAILED: &str = "生成场景失败，请重试";
const NOTICE_DESCRIPTION_REQUIRED: &str = "请填写场景描述";

#[derive(Clone, Copy, PartialEq)]
enum BuilderField {
    Description,
    ChildState,
    Goal,
}

impl BuilderField {
    fn next(self) -> Self {
        match self {
            BuilderField::Description => BuilderField::ChildState,
            BuilderField::ChildState => BuilderField::Goal,
            BuilderField::Goal => BuilderField::Description,
        }
    }
}

struct BuilderState {
    field: BuilderField,
    description: String,
    state_index: usize,
    goal: String,
    generating: bool,
    notice: Option<String>,
    cancel: Option<CancellationToken>,
}

impl BuilderState {
    fn new() -> Self {
        Self {
            field: BuilderField::Description,
            description: String::new(),
            state_index: 0,
            goal: String::new(),
            generating: false,
            notice: None,
            cancel: None,
        }
    }

    fn child_state(&self) -> &'static str {
        CUSTOM_CHILD_STATES[self.state_index]
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum EndPrompt {
    EmptyTranscript,
    LowConfidence,
}

struct ChatState {
    session: PracticeSession,
    input: String,
    awaiting_reply: bool,
    generating_report: bool,
    end_prompt: Option<EndPrompt>,
    notice: Option<String>,
}

impl ChatState {
    fn new(session: PracticeSession) -> Self {
        Self {
            session,
            input: String::new(),
            awaiting_reply: false,
            generating_report: false,
            end_prompt: None,
            notice: None,
        }
    }
}

#[derive(Clone, Copy, PartialEq)]
enum ReportTab {
    Analysis,
    Transcript,
}

struct ReportState {
    scenario: Scenario,
    report: ReportData,
    transcript: Vec<Message>,
    tab: ReportTab,
    scroll: u16,
    from_history: bool,
}

enum Screen {
    Home { slide: usize, recent: usize },
    ScenarioPicker { selected: usize },
    Builder(BuilderState),
    Chat(ChatState),
    Report(ReportState),
    History { selected: usize },
}

enum UiEvent {
    ChildReply { epoch: u64, result: Result<String> },
    ReportReady { epoch: u64, result: Result<Option<ReportData>> },
    ScenarioDrafted { epoch: u64, result: Result<Scenario> },
    HistorySaved { result: Result<()> },
}

struct App {
    catalog: Vec<Scenario>,
    records: Vec<PracticeRecord>,
    client: RoleplayClient,
    store: HistoryStore,
    screen: Screen,
    // Bumped on every screen change; async results carry the value they were
    // spawned under and are dropped on mismatch.
    epoch: u64,
    events_tx: mpsc::UnboundedSender<UiEvent>,
    events_rx: mpsc::UnboundedReceiver<UiEvent>,
    should_quit: bool,
}

impl App {
    fn new(client: RoleplayClient, store: HistoryStore, records: Vec<PracticeRecord>) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            catalog: catalog::builtin_scenarios(),
            records,
            client,
            store,
            screen: Screen::Home { slide: 0, recent: 0 },
            epoch: 0,
            events_tx,
            events_rx,
            should_quit: false,
        }
    }

    fn set_screen(&mut self, screen: Screen) {
        if let Screen::Builder(builder) = &self.screen {
            if let Some(cancel) = &builder.cancel {
                cancel.cancel();
            }
        }
        self.epoch += 1;
        self.screen = screen;
    }

    fn start_session(&mut self, scenario: Scenario) {
        self.set_screen(Screen::Chat(ChatState::new(PracticeSession::begin(scenario))));
    }

    fn advance_carousel(&mut self) {
        if let Screen::Home { slide, .. } = &mut self.screen {
            let count = self.catalog.len().max(1);
            *slide = (*slide + 1) % count;
        }
    }

    fn drain_events(&mut self) {
        while let Ok(event) = self.events_rx.try_recv() {
            self.apply_event(event);
        }
    }

    fn on_key(&mut self, key: KeyCode) {
        match self.screen {
            Screen::Home { .. } => self.on_home_key(key),
            Screen::ScenarioPicker { .. } => self.on_picker_key(key),
            Screen::Builder(_) => self.on_builder_key(key),
            Screen::Chat(_) => self.on_chat_key(key),
            Screen::Report(_) => self.on_report_key(key),
            Screen::History { .. } => self.on_history_key(key),
        }
    }

    fn on_home_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('s') => self.set_screen(Screen::ScenarioPicker { selected: 0 }),
            KeyCode::Char('c') => self.set_screen(Screen::Builder(BuilderState::new())),
            KeyCode::Char('h') => self.set_screen(Screen::History { selected: 0 }),
            KeyCode::Left => {
                if let Screen::Home { slide, .. } = &mut self.screen {
                    let count = self.catalog.len().max(1);
                    *slide = (*slide + count - 1) % count;
                }
            }
            KeyCode::Right => self.advance_carousel(),
            KeyCode::Up => {
                if let Screen::Home { recent, .. } = &mut self.screen {
                    *recent = recent.saturating_sub(1);
                }
            }
            KeyCode::Down => {
                if let Screen::Home { recent, .. } = &mut self.screen {
                    let shown = self.records.len().min(HOME_RECENT_RECORDS);
                    if *recent + 1 < shown {
                        *recent += 1;
                    }
                }
            }
            KeyCode::Enter => {
                if let Screen::Home { slide, .. } = self.screen {
                    if let Some(scenario) = self.catalog.get(slide).cloned() {
                        self.start_session(scenario);
                    }
                }
            }
            KeyCode::Char('v') => {
                if let Screen::Home { recent, .. } = self.screen {
                    self.view_record(recent);
                }
            }
            KeyCode::Char('d') => {
                if let Screen::Home { recent, .. } = self.screen {
                    self.delete_record(recent);
                }
            }
            _ => {}
        }
    }

    fn on_picker_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Esc => self.set_screen(Screen::Home { slide: 0, recent: 0 }),
            KeyCode::Char('c') => self.set_screen(Screen::Builder(BuilderState::new())),
            KeyCode::Up => {
                if let Screen::ScenarioPicker { selected } = &mut self.screen {
                    *selected = selected.saturating_sub(1);
                }
            }
            KeyCode::Down => {
                if let Screen::ScenarioPicker { selected } = &mut self.screen {
                    if *selected + 1 < self.catalog.len() {
                        *selected += 1;
                    }
                }
            }
            KeyCode::Enter => {
                if let Screen::ScenarioPicker { selected } = self.screen {
                    if let Some(scenario) = self.catalog.get(selected).cloned() {
                        self.start_session(scenario);
                    }
                }
            }
            _ => {}
        }
    }

    fn on_builder_key(&mut self, key: KeyCode) {
        if key == KeyCode::Esc {
            // Leaving cancels any in-flight draft through the screen-change hook.
            self.set_screen(Screen::Home { slide: 0, recent: 0 });
            return;
        }
        if matches!(&self.screen, Screen::Builder(builder) if builder.generating) {
            return;
        }
        if key == KeyCode::Enter {
            self.submit_builder();
            return;
        }

        let Screen::Builder(builder) = &mut self.screen else {
            return;
        };
        builder.notice = None;
        match key {
            KeyCode::Tab => builder.field = builder.field.next(),
            KeyCode::Left => {
                if builder.field == BuilderField::ChildState {
                    let count = CUSTOM_CHILD_STATES.len();
                    builder.state_index = (builder.state_index + count - 1) % count;
                }
            }
            KeyCode::Right => {
                if builder.field == BuilderField::ChildState {
                    builder.state_index = (builder.state_index + 1) % CUSTOM_CHILD_STATES.len();
                }
            }
            KeyCode::Backspace => match builder.field {
                BuilderField::Description => {
                    builder.description.pop();
                }
                BuilderField::Goal => {
                    builder.goal.pop();
                }
                BuilderField::ChildState => {}
            },
            KeyCode::Char(c) => match builder.field {
                BuilderField::Description => {
                    if builder.description.chars().count() < MAX_DESCRIPTION_CHARS {
                        builder.description.push(c);
                    }
                }
                BuilderField::Goal => builder.goal.push(c),
                BuilderField::ChildState => {}
            },
            _ => {}
        }
    }

    fn submit_builder(&mut self) {
        let epoch = self.epoch;
        let Screen::Builder(builder) = &mut self.screen else {
            return;
        };
        if builder.generating {
            return;
        }
        if builder.description.trim().is_empty() {
            builder.notice = Some(NOTICE_DESCRIPTION_REQUIRED.to_string());
            return;
        }

        let cancel = CancellationToken::new();
        builder.generating = true;
        builder.cancel = Some(cancel.clone());
        let input = CustomScenarioInput {
            description: builder.description.clone(),
            child_state: builder.child_state().to_string(),
            goal: builder.goal.clone(),
        };

        let client = self.client.clone();
        let tx = self.events_tx.clone();
        tokio::spawn(async move {
            let result = client.draft_custom_scenario(&input, &cancel).await;
            let _ = tx.send(UiEvent::ScenarioDrafted { epoch, result });
        });
    }

    fn on_chat_key(&mut self, key: KeyCode) {
        let prompt = match &self.screen {
            Screen::Chat(chat) => chat.end_prompt,
            _ => return,
        };

        if let Some(prompt) = prompt {
            match prompt {
                EndPrompt::EmptyTranscript => {
                    if matches!(key, KeyCode::Enter | KeyCode::Esc) {
                        if let Screen::Chat(chat) = &mut self.screen {
                            chat.end_prompt = None;
                        }
                    }
                }
                EndPrompt::LowConfidence => match key {
                    KeyCode::Char('y') => {
                        if let Screen::Chat(chat) = &mut self.screen {
                            chat.end_prompt = None;
                        }
                        self.begin_report();
                    }
                    KeyCode::Char('n') | KeyCode::Esc => {
                        if let Screen::Chat(chat) = &mut self.screen {
                            chat.end_prompt = None;
                        }
                    }
                    _ => {}
                },
            }
            return;
        }

        match key {
            KeyCode::Esc => self.set_screen(Screen::ScenarioPicker { selected: 0 }),
            KeyCode::Tab => self.request_end_session(),
            KeyCode::Enter => self.submit_parent_message(),
            KeyCode::Backspace => {
                if let Screen::Chat(chat) = &mut self.screen {
                    chat.notice = None;
                    if !chat.awaiting_reply && !chat.generating_report {
                        chat.input.pop();
                    }
                }
            }
            KeyCode::Char(c) => {
                if let Screen::Chat(chat) = &mut self.screen {
                    chat.notice = None;
                    if !chat.awaiting_reply
                        && !chat.generating_report
                        && !chat.session.budget_exhausted()
                    {
                        chat.input.push(c);
                    }
                }
            }
            _ => {}
        }
    }

    fn submit_parent_message(&mut self) {
        let epoch = self.epoch;
        let Screen::Chat(chat) = &mut self.screen else {
            return;
        };
        chat.notice = None;
        if chat.awaiting_reply || chat.generating_report {
            return;
        }
        let text = chat.input.clone();
        if !chat.session.push_parent(&text) {
            return;
        }
        chat.input.clear();
        chat.awaiting_reply = true;

        let description = chat.session.scenario().description.clone();
        let transcript = chat.session.transcript().to_vec();
        let client = self.client.clone();
        let tx = self.events_tx.clone();
        tokio::spawn(async move {
            let result = client.next_child_reply(&description, &transcript).await;
            let _ = tx.send(UiEvent::ChildReply { epoch, result });
        });
    }

    fn request_end_session(&mut self) {
        let guard = {
            let Screen::Chat(chat) = &mut self.screen else {
                return;
            };
            chat.notice = None;
            if chat.awaiting_reply || chat.generating_report {
                return;
            }
            chat.session.end_guard()
        };

        match guard {
            EndGuard::Ready => self.begin_report(),
            EndGuard::EmptyTranscript => {
                if let Screen::Chat(chat) = &mut self.screen {
                    chat.end_prompt = Some(EndPrompt::EmptyTranscript);
                }
            }
            EndGuard::LowConfidence => {
                if let Screen::Chat(chat) = &mut self.screen {
                    chat.end_prompt = Some(EndPrompt::LowConfidence);
                }
            }
        }
    }

    fn begin_report(&mut self) {
        let epoch = self.epoch;
        let Screen::Chat(chat) = &mut self.screen else {
            return;
        };
        if chat.awaiting_reply || chat.generating_report {
            return;
        }
        chat.generating_report = true;

        let transcript = chat.session.transcript().to_vec();
        let client = self.client.clone();
        let tx = self.events_tx.clone();
        tokio::spawn(async move {
            let result = client.assess_conversation(&transcript).await;
            let _ = tx.send(UiEvent::ReportReady { epoch, result });
        });
    }

    fn on_report_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Tab => {
                if let Screen::Report(state) = &mut self.screen {
                    state.tab = match state.tab {
                        ReportTab::Analysis => ReportTab::Transcript,
                        ReportTab::Transcript => ReportTab::Analysis,
                    };
                    state.scroll = 0;
                }
            }
            KeyCode::Up => {
                if let Screen::Report(state) = &mut self.screen {
                    state.scroll = state.scroll.saturating_sub(1);
                }
            }
            KeyCode::Down => {
                if let Screen::Report(state) = &mut self.screen {
                    state.scroll = state.scroll.saturating_add(1);
                }
            }
            KeyCode::Char('r') => {
                let scenario = match &self.screen {
                    Screen::Report(state) => state.scenario.clone(),
                    _ => return,
                };
                self.start_session(scenario);
            }
            KeyCode::Esc => {
                let from_history = match &self.screen {
                    Screen::Report(state) => state.from_history,
                    _ => return,
                };
                if from_history {
                    self.set_screen(Screen::History { selected: 0 });
                } else {
                    self.set_screen(Screen::Home { slide: 0, recent: 0 });
                }
            }
            _ => {}
        }
    }

    fn on_history_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Esc => self.set_screen(Screen::Home { slide: 0, recent: 0 }),
            KeyCode::Up => {
                if let Screen::History { selected } = &mut self.screen {
                    *selected = selected.saturating_sub(1);
                }
            }
            KeyCode::Down => {
                if let Screen::History { selected } = &mut self.screen {
                    if *selected + 1 < self.records.len() {
                        *selected += 1;
                    }
                }
            }
            KeyCode::Enter => {
                if let Screen::History { selected } = self.screen {
                    self.view_record(selected);
                }
            }
            KeyCode::Char('d') => {
                if let Screen::History { selected } = self.screen {
                    self.delete_record(selected);
                }
            }
            _ => {}
        }
    }

    fn view_record(&mut self, index: usize) {
        let Some(record) = self.records.get(index) else {
            return;
        };
        // Records of custom scenarios have no live catalog entry and stay
        // list-only, like records whose scenario was removed.
        let Some(scenario) = self
            .catalog
            .iter()
            .find(|scenario| scenario.id == record.scenario_id)
            .cloned()
        else {
            return;
        };
        let report = record.report.clone();
        let transcript = record.chat_history.clone();
        let from_history = matches!(self.screen, Screen::History { .. });
        self.set_screen(Screen::Report(ReportState {
            scenario,
            report,
            transcript,
            tab: ReportTab::Analysis,
            scroll: 0,
            from_history,
        }));
    }

    fn delete_record(&mut self, index: usize) {
        if index >= self.records.len() {
            return;
        }
        self.records.remove(index);
        let len = self.records.len();
        match &mut self.screen {
            Screen::Home { recent, .. } => {
                let shown = len.min(HOME_RECENT_RECORDS);
                *recent = (*recent).min(shown.saturating_sub(1));
            }
            Screen::History { selected } => {
                *selected = (*selected).min(len.saturating_sub(1));
            }
            _ => {}
        }
        self.persist_history();
    }

    fn persist_history(&self) {
        let store = self.store.clone();
        let records = self.records.clone();
        let tx = self.events_tx.clone();
        tokio::spawn(async move {
            let result = store.save(&records).await;
            let _ = tx.send(UiEvent::HistorySaved { result });
        });
    }

    fn apply_event(&mut self, event: UiEvent) {
        match event {
            UiEvent::ChildReply { epoch, result } => {
                if epoch != self.epoch {
                    return;
                }
                let Screen::Chat(chat) = &mut self.screen else {
                    return;
                };
                chat.awaiting_reply = false;
                match result {
                    Ok(reply) => chat.session.push_child(reply),
                    Err(error) => {
                        warn!(%error, "child reply failed");
                        chat.notice = Some(NOTICE_REPLY_FAILED.to_string());
                    }
                }
            }
            UiEvent::ReportReady { epoch, result } => {
                if epoch != self.epoch {
                    return;
                }
                self.finish_report(result);
            }
            UiEvent::ScenarioDrafted { epoch, result } => {
                if epoch != self.epoch {
                    return;
                }
                match result {
                    Ok(scenario) => self.start_session(scenario),
                    Err(error) => {
                        warn!(%error, "scenario draft failed");
                        let Screen::Builder(builder) = &mut self.screen else {
                            return;
                        };
                        builder.generating = false;
                        builder.cancel = None;
                        builder.notice = Some(NOTICE_DRAFT_FAILED.to_string());
                    }
                }
            }
            UiEvent::HistorySaved { result } => {
                if let Err(error) = result {
                    warn!(%error, "history save failed");
                }
            }
        }
    }

    fn finish_report(&mut self, result: Result<Option<ReportData>>) {
        let report = match result {
            Ok(Some(report)) => report,
            Ok(None) => {
                self.report_failed();
                return;
            }
            Err(error) => {
                warn!(%error, "report generation failed");
                self.report_failed();
                return;
            }
        };

        let (record, state) = {
            let Screen::Chat(chat) = &mut self.screen else {
                return;
            };
            chat.generating_report = false;
            let scenario = chat.session.scenario().clone();
            let transcript = chat.session.transcript().to_vec();
            let record = chat.session.clone().into_record(report.clone());
            (
                record,
                ReportState {
                    scenario,
                    report,
                    transcript,
                    tab: ReportTab::Analysis,
                    scroll: 0,
                    from_history: false,
                },
            )
        };

        self.records.insert(0, record);
        self.persist_history();
        self.set_screen(Screen::Report(state));
    }

    fn report_failed(&mut self) {
        let Screen::Chat(chat) = &mut self.screen else {
            return;
        };
        chat.generating_report = false;
        chat.notice = Some(NOTICE_REPORT_FAILED.to_string());
    }
}

pub async fn run_tui(client: RoleplayClient, store: HistoryStore) -> Result<()> {
    let records = store.load().await?;

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(client, store, records);
    let run_result = run_app(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    run_result
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> Result<()> {
    let mut slide_tick = Instant::now();
    loop {
        app.drain_events();

        if slide_tick.elapsed() >= CAROUSEL_INTERVAL {
            app.advance_carousel();
            slide_tick = Instant::now();
        }

        terminal.draw(|frame| ui::render(frame, app))?;

        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.on_key(key.code);
                }
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}
