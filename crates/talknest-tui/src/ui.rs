use chrono::{DateTime, Utc};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Gauge, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};
use talknest_core::{CUSTOM_CHILD_STATES, MAX_DESCRIPTION_CHARS};
use talknest_schema::{Level, Message, Role};

use crate::{
    App, BuilderField, BuilderState, ChatState, EndPrompt, ReportState, ReportTab, Screen,
    HOME_RECENT_RECORDS,
};

const DAILY_TIP: &str =
    "“当孩子情绪激动时，试着把他们的情绪‘映射’回去。比如可以说：‘听起来你对那件事感到很沮丧……’，然后再给出建议。”";
const DISCLAIMER: &str =
    "免责声明：本报告由AI模拟生成，仅供沟通练习与参考体验，不作为实际家庭教育或心理咨询的专业指导意见。";

pub(crate) fn render(frame: &mut Frame, app: &App) {
    match &app.screen {
        Screen::Home { slide, recent } => render_home(frame, app, *slide, *recent),
        Screen::ScenarioPicker { selected } => render_picker(frame, app, *selected),
        Screen::Builder(builder) => render_builder(frame, builder),
        Screen::Chat(chat) => render_chat(frame, chat),
        Screen::Report(state) => render_report(frame, state),
        Screen::History { selected } => render_history(frame, app, *selected),
    }
}

fn render_home(frame: &mut Frame, app: &App, slide: usize, recent: usize) {
    let areas = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(7),
            Constraint::Length(1),
            Constraint::Min(5),
            Constraint::Length(5),
            Constraint::Length(1),
        ])
        .split(frame.area());

    let title = Paragraph::new(Line::styled(
        "和谐亲子家园",
        Style::default().add_modifier(Modifier::BOLD),
    ))
    .alignment(Alignment::Center);
    frame.render_widget(title, areas[0]);

    if let Some(scenario) = app.catalog.get(slide) {
        let dots: String = (0..app.catalog.len())
            .map(|idx| if idx == slide { "●" } else { "○" })
            .collect::<Vec<_>>()
            .join(" ");
        let hero_lines = vec![
            Line::from(Span::styled(
                format!(" {} ", scenario.category),
                Style::default().fg(Color::Black).bg(Color::Green),
            )),
            Line::styled(
                scenario.title.clone(),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Line::styled(scenario.description.clone(), Style::default().fg(Color::DarkGray)),
            Line::styled(dots, Style::default().fg(Color::Green)).alignment(Alignment::Center),
        ];
        let hero = Paragraph::new(hero_lines)
            .wrap(Wrap { trim: true })
            .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(Color::Green)));
        frame.render_widget(hero, areas[1]);
    }

    let menu = Paragraph::new(key_hints(&[
        ("s", "场景练习"),
        ("c", "自定义场景"),
        ("h", "全部练习记录"),
    ]))
    .alignment(Alignment::Center);
    frame.render_widget(menu, areas[2]);

    render_home_history(frame, app, recent, areas[3]);

    let tip = Paragraph::new(DAILY_TIP)
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray))
                .title(Span::styled(" 每日小贴士 ", Style::default().fg(Color::Yellow))),
        );
    frame.render_widget(tip, areas[4]);

    let footer = Paragraph::new(key_hints(&[
        ("Enter", "开始练习"),
        ("←→", "切换场景"),
        ("↑↓", "选择记录"),
        ("v", "查看"),
        ("d", "删除"),
        ("q", "退出"),
    ]));
    frame.render_widget(footer, areas[5]);
}

fn render_home_history(frame: &mut Frame, app: &App, recent: usize, area: Rect) {
    let mut title_spans = vec![
        Span::styled(" 历史练习 ", Style::default().add_modifier(Modifier::BOLD)),
        Span::styled(
            format!(" 已完成 {} 次练习 ", app.records.len()),
            Style::default().fg(Color::DarkGray),
        ),
    ];
    if app.records.len() > HOME_RECENT_RECORDS {
        title_spans.push(Span::styled(
            " 查看全部 [h] ",
            Style::default().fg(Color::Green),
        ));
    }
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(Line::from(title_spans));

    if app.records.is_empty() {
        let empty = Paragraph::new(Line::styled(
            "暂无练习记录",
            Style::default().fg(Color::DarkGray),
        ))
        .alignment(Alignment::Center)
        .block(block);
        frame.render_widget(empty, area);
        return;
    }

    let items: Vec<ListItem> = app
        .records
        .iter()
        .take(HOME_RECENT_RECORDS)
        .map(|record| {
            ListItem::new(Line::from(vec![
                Span::raw(format!("场景：{}", record.scenario_title)),
                Span::styled(
                    format!("  {}", local_date(&record.timestamp)),
                    Style::default().fg(Color::DarkGray),
                ),
                Span::styled("  共情: ", Style::default().fg(Color::DarkGray)),
                Span::styled(
                    record.report.empathy.level.label(),
                    Style::default().fg(level_color(record.report.empathy.level)),
                ),
            ]))
        })
        .collect();
    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().add_modifier(Modifier::BOLD))
        .highlight_symbol("> ");
    let mut state = ListState::default().with_selected(Some(recent));
    frame.render_stateful_widget(list, area, &mut state);
}

fn render_picker(frame: &mut Frame, app: &App, selected: usize) {
    let areas = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(frame.area());

    let header = Paragraph::new(vec![
        Line::styled("练习模式", Style::default().fg(Color::DarkGray)),
        Line::styled(
            "选择练习场景",
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Line::styled(
            "选择以下场景进行角色扮演，提升与孩子的沟通技巧。",
            Style::default().fg(Color::DarkGray),
        ),
    ]);
    frame.render_widget(header, areas[0]);

    let items: Vec<ListItem> = app
        .catalog
        .iter()
        .map(|scenario| {
            ListItem::new(vec![
                Line::from(vec![
                    Span::styled(
                        format!("{} ", scenario.category),
                        Style::default().fg(Color::Green),
                    ),
                    Span::styled(
                        scenario.title.clone(),
                        Style::default().add_modifier(Modifier::BOLD),
                    ),
                ]),
                Line::styled(
                    format!("  {}", scenario.description),
                    Style::default().fg(Color::DarkGray),
                ),
            ])
        })
        .collect();
    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(Color::DarkGray)))
        .highlight_style(Style::default().fg(Color::Green))
        .highlight_symbol("> ");
    let mut state = ListState::default().with_selected(Some(selected));
    frame.render_stateful_widget(list, areas[1], &mut state);

    let footer = Paragraph::new(key_hints(&[
        ("↑↓", "选择"),
        ("Enter", "开始练习"),
        ("c", "自定义场景"),
        ("Esc", "返回"),
        ("q", "退出"),
    ]));
    frame.render_widget(footer, areas[2]);
}

fn render_builder(frame: &mut Frame, builder: &BuilderState) {
    let areas = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(7),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(2),
            Constraint::Length(1),
        ])
        .split(frame.area());

    let title = Paragraph::new(Line::styled(
        "自定义场景",
        Style::default().add_modifier(Modifier::BOLD),
    ))
    .alignment(Alignment::Center);
    frame.render_widget(title, areas[0]);

    let description_title = Line::from(vec![
        Span::raw(" 场景描述 "),
        Span::styled(
            format!(
                " {}/{} ",
                builder.description.chars().count(),
                MAX_DESCRIPTION_CHARS
            ),
            Style::default().fg(Color::DarkGray),
        ),
    ]);
    let description = field_text(
        &builder.description,
        "例如：孩子放学回家后一直躲在房间里，不出来吃饭，也不愿意说话...",
        builder.field == BuilderField::Description,
    );
    let description_box = Paragraph::new(description)
        .wrap(Wrap { trim: false })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(field_border(builder.field == BuilderField::Description))
                .title(description_title),
        );
    frame.render_widget(description_box, areas[1]);

    let mut chips = Vec::new();
    for (index, state) in CUSTOM_CHILD_STATES.iter().enumerate() {
        let style = if index == builder.state_index {
            Style::default().fg(Color::Black).bg(Color::Green)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        chips.push(Span::styled(format!(" {state} "), style));
        chips.push(Span::raw(" "));
    }
    let states = Paragraph::new(Line::from(chips)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(field_border(builder.field == BuilderField::ChildState))
            .title(" 角色设定 (孩子状态) "),
    );
    frame.render_widget(states, areas[2]);

    let goal = Paragraph::new(field_text(
        &builder.goal,
        "例如：了解孩子为什么不开心",
        builder.field == BuilderField::Goal,
    ))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(field_border(builder.field == BuilderField::Goal))
            .title(" 核心目标 "),
    );
    frame.render_widget(goal, areas[3]);

    let mut info_lines = vec![Line::styled(
        "明确的目标有助于AI扮演更合适的角色。",
        Style::default().fg(Color::DarkGray),
    )];
    if let Some(notice) = &builder.notice {
        info_lines.push(Line::styled(
            notice.clone(),
            Style::default().fg(Color::Red),
        ));
    }
    frame.render_widget(Paragraph::new(info_lines), areas[4]);

    let footer = if builder.generating {
        let mut line = Line::styled("正在生成场景...", Style::default().fg(Color::Yellow));
        line.spans.extend(key_hints(&[("Esc", "取消")]).spans);
        Paragraph::new(line)
    } else {
        Paragraph::new(key_hints(&[
            ("Tab", "切换"),
            ("←→", "选择状态"),
            ("Enter", "开始练习"),
            ("Esc", "返回"),
        ]))
    };
    frame.render_widget(footer, areas[5]);
}

fn render_chat(frame: &mut Frame, chat: &ChatState) {
    let areas = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Length(4),
            Constraint::Min(0),
            Constraint::Length(1),
            Constraint::Length(3),
            Constraint::Length(1),
        ])
        .split(frame.area());

    let scenario = chat.session.scenario();
    let header = Paragraph::new(vec![
        Line::styled("沟通练习会话", Style::default().add_modifier(Modifier::BOLD)),
        Line::styled(
            format!("场景：{}", scenario.title),
            Style::default().fg(Color::Green),
        ),
    ])
    .alignment(Alignment::Center);
    frame.render_widget(header, areas[0]);

    let card = Paragraph::new(Line::styled(
        scenario.description.clone(),
        Style::default().fg(Color::DarkGray),
    ))
    .wrap(Wrap { trim: true })
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Green))
            .title(Span::styled(
                format!(" {} ", scenario.title),
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
            )),
    );
    frame.render_widget(card, areas[1]);

    let lines = transcript_lines(chat.session.transcript(), chat.awaiting_reply);
    let offset = (lines.len() as u16).saturating_sub(areas[2].height);
    let transcript = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .scroll((offset, 0));
    frame.render_widget(transcript, areas[2]);

    frame.render_widget(chat_banner(chat), areas[3]);

    let can_type =
        !chat.awaiting_reply && !chat.generating_report && !chat.session.budget_exhausted();
    let input_text = if chat.session.budget_exhausted() {
        Line::styled("已达到最大对话次数", Style::default().fg(Color::DarkGray))
    } else {
        field_text(&chat.input, "输入你的回复...", can_type)
    };
    let input = Paragraph::new(input_text).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(field_border(can_type)),
    );
    frame.render_widget(input, areas[4]);

    let footer = if chat.generating_report {
        let mut line = Line::styled("正在生成报告...", Style::default().fg(Color::Yellow));
        line.spans.extend(key_hints(&[("Esc", "返回")]).spans);
        Paragraph::new(line)
    } else {
        Paragraph::new(key_hints(&[
            ("Enter", "发送"),
            ("Tab", "结束对话并查看报告"),
            ("Esc", "返回"),
        ]))
    };
    frame.render_widget(footer, areas[5]);

    if let Some(prompt) = chat.end_prompt {
        render_end_prompt(frame, prompt);
    }
}

fn chat_banner(chat: &ChatState) -> Paragraph<'static> {
    let line = if let Some(notice) = &chat.notice {
        Line::styled(notice.clone(), Style::default().fg(Color::Red))
    } else if chat.session.budget_exhausted() {
        Line::styled(
            "已达到最大对话次数，请点击下方按钮查看报告",
            Style::default().fg(Color::Red),
        )
    } else if let Some(remaining) = chat.session.turn_warning() {
        Line::styled(
            format!("提示：距离对话结束还有 {remaining} 次机会"),
            Style::default().fg(Color::Yellow),
        )
    } else {
        Line::raw("")
    };
    Paragraph::new(line).alignment(Alignment::Center)
}

fn render_end_prompt(frame: &mut Frame, prompt: EndPrompt) {
    let area = centered_rect(60, 30, frame.area());
    frame.render_widget(Clear, area);

    let (title, body, actions) = match prompt {
        EndPrompt::EmptyTranscript => (
            " 提示 ",
            "请先开始对话后再生成报告，以确保分析的有效性。",
            key_hints(&[("Enter", "知道了")]),
        ),
        EndPrompt::LowConfidence => (
            " 确认结束对话？ ",
            "当前对话次数较少（少于3次），AI分析结果可能不够准确。是否坚持生成报告？",
            key_hints(&[("n", "继续沟通"), ("y", "坚持生成")]),
        ),
    };

    let lines = vec![
        Line::raw(body),
        Line::raw(""),
        actions.alignment(Alignment::Center),
    ];
    let modal = Paragraph::new(lines).wrap(Wrap { trim: true }).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Yellow))
            .title(Span::styled(
                title,
                Style::default().add_modifier(Modifier::BOLD),
            )),
    );
    frame.render_widget(modal, area);
}

fn render_report(frame: &mut Frame, state: &ReportState) {
    let areas = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Min(0),
            Constraint::Length(1),
            Constraint::Length(2),
        ])
        .split(frame.area());

    let tab_style = |active: bool| {
        if active {
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::DarkGray)
        }
    };
    let header = Paragraph::new(vec![
        Line::styled("练习回顾", Style::default().add_modifier(Modifier::BOLD)),
        Line::from(vec![
            Span::styled("分析报告", tab_style(state.tab == ReportTab::Analysis)),
            Span::raw("  |  "),
            Span::styled("对话回顾", tab_style(state.tab == ReportTab::Transcript)),
        ]),
    ])
    .alignment(Alignment::Center);
    frame.render_widget(header, areas[0]);

    match state.tab {
        ReportTab::Analysis => render_analysis(frame, state, areas[1]),
        ReportTab::Transcript => {
            let lines = transcript_lines(&state.transcript, false);
            let transcript = Paragraph::new(lines)
                .wrap(Wrap { trim: false })
                .scroll((state.scroll, 0));
            frame.render_widget(transcript, areas[1]);
        }
    }

    let back_label = if state.from_history { "返回记录" } else { "返回首页" };
    let footer = Paragraph::new(key_hints(&[
        ("Tab", "切换"),
        ("↑↓", "滚动"),
        ("r", "再练一次"),
        ("Esc", back_label),
        ("q", "退出"),
    ]));
    frame.render_widget(footer, areas[2]);

    let disclaimer = Paragraph::new(Line::styled(
        DISCLAIMER,
        Style::default().fg(Color::DarkGray),
    ))
    .wrap(Wrap { trim: true })
    .alignment(Alignment::Center);
    frame.render_widget(disclaimer, areas[3]);
}

fn render_analysis(frame: &mut Frame, state: &ReportState, area: Rect) {
    let dimensions = state.report.dimensions();
    let skip = (state.scroll as usize).min(dimensions.len() - 1);
    let shown = &dimensions[skip..];

    let mut constraints = vec![Constraint::Length(3)];
    constraints.extend(shown.iter().map(|_| Constraint::Length(5)));
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(area);

    let intro = Paragraph::new(vec![
        Line::styled("分析完成", Style::default().add_modifier(Modifier::BOLD)),
        Line::styled(
            "这是您在5个维度的详细沟通行为分析。",
            Style::default().fg(Color::DarkGray),
        ),
    ])
    .alignment(Alignment::Center);
    frame.render_widget(intro, chunks[0]);

    for (index, (title, dimension)) in shown.iter().enumerate() {
        let chunk = chunks[index + 1];
        let color = level_color(dimension.level);
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray))
            .title(Line::from(vec![
                Span::styled(
                    format!(" {title} "),
                    Style::default().add_modifier(Modifier::BOLD),
                ),
                Span::styled(format!(" {} ", dimension.level.label()), Style::default().fg(color)),
            ]));
        let inner = block.inner(chunk);
        frame.render_widget(block, chunk);

        let parts = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(1), Constraint::Length(1)])
            .split(inner);
        let reason = Paragraph::new(dimension.reason.clone())
            .style(Style::default().fg(Color::DarkGray))
            .wrap(Wrap { trim: true });
        frame.render_widget(reason, parts[0]);
        let gauge = Gauge::default()
            .ratio(level_ratio(dimension.level))
            .gauge_style(Style::default().fg(color));
        frame.render_widget(gauge, parts[1]);
    }
}

fn render_history(frame: &mut Frame, app: &App, selected: usize) {
    let areas = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(frame.area());

    let title = Paragraph::new(Line::styled(
        "全部练习记录",
        Style::default().add_modifier(Modifier::BOLD),
    ))
    .alignment(Alignment::Center);
    frame.render_widget(title, areas[0]);

    if app.records.is_empty() {
        let empty = Paragraph::new(Line::styled(
            "暂无练习记录",
            Style::default().fg(Color::DarkGray),
        ))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(Color::DarkGray)));
        frame.render_widget(empty, areas[1]);
    } else {
        let items: Vec<ListItem> = app
            .records
            .iter()
            .map(|record| {
                ListItem::new(Line::from(vec![
                    Span::raw(format!("场景：{}", record.scenario_title)),
                    Span::styled(
                        format!("  {}", local_date(&record.timestamp)),
                        Style::default().fg(Color::DarkGray),
                    ),
                    Span::styled("  共情: ", Style::default().fg(Color::DarkGray)),
                    Span::styled(
                        record.report.empathy.level.label(),
                        Style::default().fg(level_color(record.report.empathy.level)),
                    ),
                    Span::styled("  查看报告 >", Style::default().fg(Color::DarkGray)),
                ]))
            })
            .collect();
        let list = List::new(items)
            .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(Color::DarkGray)))
            .highlight_style(Style::default().add_modifier(Modifier::BOLD))
            .highlight_symbol("> ");
        let mut state = ListState::default().with_selected(Some(selected));
        frame.render_stateful_widget(list, areas[1], &mut state);
    }

    let footer = Paragraph::new(key_hints(&[
        ("↑↓", "选择"),
        ("Enter", "查看报告"),
        ("d", "删除"),
        ("Esc", "返回"),
        ("q", "退出"),
    ]));
    frame.render_widget(footer, areas[2]);
}

fn transcript_lines(messages: &[Message], typing: bool) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    if let Some(first) = messages.first() {
        lines.push(
            Line::styled(
                format!("今天 {}", local_time(&first.timestamp)),
                Style::default().fg(Color::DarkGray),
            )
            .alignment(Alignment::Center),
        );
        lines.push(Line::raw(""));
    }

    for message in messages {
        match message.role {
            Role::Child => {
                lines.push(Line::styled("孩子", Style::default().fg(Color::DarkGray)));
                lines.push(Line::raw(message.text.clone()));
            }
            Role::Parent => {
                lines.push(Line::raw(message.text.clone()).alignment(Alignment::Right));
                lines.push(
                    Line::styled("已送达 ✓", Style::default().fg(Color::DarkGray))
                        .alignment(Alignment::Right),
                );
            }
        }
        lines.push(Line::raw(""));
    }

    if typing {
        lines.push(Line::styled("孩子", Style::default().fg(Color::DarkGray)));
        lines.push(Line::styled("· · ·", Style::default().fg(Color::DarkGray)));
    }

    lines
}

fn field_text<'a>(value: &'a str, placeholder: &'a str, focused: bool) -> Line<'a> {
    if value.is_empty() {
        Line::styled(placeholder, Style::default().fg(Color::DarkGray))
    } else if focused {
        Line::raw(format!("{value}_"))
    } else {
        Line::raw(value)
    }
}

fn field_border(focused: bool) -> Style {
    if focused {
        Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::DarkGray)
    }
}

fn level_color(level: Level) -> Color {
    match level {
        Level::NeedsAttention => Color::Red,
        Level::Average => Color::Yellow,
        Level::Good => Color::Green,
    }
}

fn level_ratio(level: Level) -> f64 {
    match level {
        Level::NeedsAttention => 0.25,
        Level::Average => 0.55,
        Level::Good => 0.85,
    }
}

fn local_date(timestamp: &DateTime<Utc>) -> String {
    timestamp
        .with_timezone(&chrono::Local)
        .format("%Y/%m/%d")
        .to_string()
}

fn local_time(timestamp: &DateTime<Utc>) -> String {
    timestamp
        .with_timezone(&chrono::Local)
        .format("%H:%M")
        .to_string()
}

fn key_hints(hints: &[(&str, &str)]) -> Line<'static> {
    let mut spans = Vec::new();
    for (key, label) in hints {
        spans.push(Span::styled(
            format!(" [{key}]"),
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        ));
        spans.push(Span::styled(
            format!(" {label} "),
            Style::default().fg(Color::DarkGray),
        ));
    }
    Line::from(spans)
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);
    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1]);
    horizontal[1]
}
