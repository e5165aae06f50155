use crate::types::{MatchStatistics, Report, Side, StatRow, Teams, TopBatters, TopBowlers};

pub const HIGHEST_SCORE: &str = "Highest Individual Score";
pub const TOTAL_FOURS: &str = "Total Match Fours";
pub const MOST_SIXES: &str = "Most Match Sixes";
pub const MOST_RUN_OUTS: &str = "Most Run Outs (by bowling side)";
pub const NO_WICKETS: &str = "No wickets";
pub const DID_NOT_BAT: &str = "Did not bat";

/// Assembles the report; values and ordering come from `statistics` untouched.
pub fn build_report(title: String, teams: Teams, statistics: MatchStatistics) -> Report {
    let rows = stat_rows(&teams, &statistics);
    let lines = render_lines(&title, &teams, &statistics);

    Report {
        title,
        teams,
        statistics,
        rows,
        lines,
    }
}

/// The fixed six stat rows, with plain (unemphasized) values.
pub fn stat_rows(teams: &Teams, stats: &MatchStatistics) -> Vec<StatRow> {
    let row = |label: String, value: String| StatRow { label, value };

    vec![
        row(HIGHEST_SCORE.to_string(), highest_score(teams, stats)),
        row(
            top_batter_label(teams, Side::First),
            top_batters(&stats.top_batters[Side::First]),
        ),
        row(
            top_batter_label(teams, Side::Second),
            top_batters(&stats.top_batters[Side::Second]),
        ),
        row(
            TOTAL_FOURS.to_string(),
            comparison(teams, Side::First, stats.fours.first, stats.fours.second, false),
        ),
        row(
            MOST_SIXES.to_string(),
            comparison(teams, Side::First, stats.sixes.first, stats.sixes.second, false),
        ),
        row(MOST_RUN_OUTS.to_string(), run_outs(teams, stats, false)),
    ]
}

/// Display lines. The larger side of each comparison is wrapped in `**`.
pub fn render_lines(title: &str, teams: &Teams, stats: &MatchStatistics) -> Vec<String> {
    let mut lines = vec![
        format!("### {title}"),
        String::new(),
        format!("{HIGHEST_SCORE}: {}", highest_score(teams, stats)),
        String::new(),
        format!(
            "{TOTAL_FOURS}: {}",
            comparison(teams, Side::First, stats.fours.first, stats.fours.second, true)
        ),
        format!(
            "Total Match Sixes: {}",
            comparison(teams, Side::First, stats.sixes.first, stats.sixes.second, true)
        ),
        String::new(),
    ];

    for side in Side::BOTH {
        lines.push(format!(
            "{}: {}",
            top_batter_label(teams, side),
            top_batters(&stats.top_batters[side])
        ));
    }
    lines.push(String::new());

    for side in Side::BOTH {
        lines.push(format!(
            "Top Bowler – {}: {}",
            teams.name(side),
            top_bowlers(&stats.top_bowlers[side])
        ));
    }
    lines.push(String::new());

    lines.push(format!("{MOST_RUN_OUTS}: {}", run_outs(teams, stats, true)));
    lines
}

fn top_batter_label(teams: &Teams, side: Side) -> String {
    format!("Top Batter – {}", teams.name(side))
}

fn highest_score(teams: &Teams, stats: &MatchStatistics) -> String {
    let highest = &stats.highest_score;
    format!(
        "{} ({}) – {}",
        highest.name,
        highest.runs,
        teams.name(highest.side)
    )
}

fn top_batters(top: &TopBatters) -> String {
    if top.names.is_empty() {
        return DID_NOT_BAT.to_string();
    }
    format!("{} ({})", top.names.join(", "), top.runs)
}

fn top_bowlers(top: &TopBowlers) -> String {
    match top {
        TopBowlers::NoWickets => NO_WICKETS.to_string(),
        TopBowlers::Best { names, wickets, .. } => names
            .iter()
            .map(|name| format!("{name} ({wickets})"))
            .collect::<Vec<_>>()
            .join(", "),
    }
}

/// Run outs are listed by bowling side: the second team bowled the first innings.
fn run_outs(teams: &Teams, stats: &MatchStatistics, emphasize: bool) -> String {
    comparison(
        teams,
        Side::Second,
        stats.run_outs.second,
        stats.run_outs.first,
        emphasize,
    )
}

/// "Left a : b Right", with the larger side emphasized when asked; ties emphasize neither.
fn comparison(teams: &Teams, left: Side, left_value: u32, right_value: u32, emphasize: bool) -> String {
    let mut left_text = format!("{} {}", teams.name(left), left_value);
    let mut right_text = format!("{} {}", right_value, teams.name(left.opponent()));

    if emphasize {
        if left_value > right_value {
            left_text = format!("**{left_text}**");
        } else if right_value > left_value {
            right_text = format!("**{right_text}**");
        }
    }

    format!("{left_text} : {right_text}")
}
