//! View builders: analytics results to renderable dashboard views

use league_analytics::{
    ChartPoint, DisplayFilter, MatchupCard, MatchupReport, MatchupSide, PlayerPerformance,
    RankingTable,
};
use league_provider::League;

use crate::error::Result;
use crate::render::{BarChart, Cell, Column, DashboardView, Metric, MetricValue, Table};

fn bar_chart(title: &str, points: Vec<ChartPoint>) -> BarChart {
    BarChart {
        title: title.to_string(),
        bars: points.into_iter().map(|p| (p.label, p.value)).collect(),
    }
}

/// Power rankings: metrics, ranked table and score chart
pub fn rankings_view(table: &RankingTable) -> Result<DashboardView> {
    let mut view = DashboardView::new(format!("Week {} Rankings", table.week));
    if table.is_empty() {
        view = view.notice(format!("No power rankings available for week {}", table.week));
    }

    let top_team = table
        .top_team()
        .map_or(MetricValue::NoData, |row| MetricValue::Text(row.team_name.clone()));
    view = view.metrics(vec![
        Metric::new("Top Team", top_team),
        Metric::new("High Score", MetricValue::from_option(table.high_score())),
        Metric::new("Total Teams", MetricValue::Integer(table.team_count() as i64)),
    ]);

    let mut rows = Table::new(
        "Rankings",
        vec![Column::integer("Rank"), Column::text("Team Name"), Column::fixed2("Points")],
    );
    for row in &table.rows {
        rows.push_row(vec![
            Cell::Integer(row.rank as i64),
            Cell::text(row.team_name.clone()),
            Cell::Number(row.score),
        ])?;
    }

    Ok(view.table(rows).chart(bar_chart("Power Scores", table.chart())))
}

/// Player performance: metrics, filtered detail, season totals and top scorers
pub fn players_view(
    performance: &PlayerPerformance,
    filter: &DisplayFilter,
    top_n: usize,
) -> Result<DashboardView> {
    let mut view = DashboardView::new(format!(
        "Player Stats (Weeks {}) - {}",
        performance.range, performance.team_filter
    ));
    if performance.is_empty() {
        view = view.notice("No player data for the selected weeks and team");
    }

    let summary = performance.summary();
    view = view.metrics(vec![
        Metric::new("Total Players", MetricValue::Integer(summary.total_players as i64)),
        Metric::new("Avg Points/Week", MetricValue::from_option(summary.average_points)),
        Metric::new(
            "Top Scorer",
            summary.top_scorer.map_or(MetricValue::NoData, MetricValue::Text),
        ),
        Metric::new("Top Score", MetricValue::from_option(summary.top_score)),
    ]);

    let mut filter_notes = Vec::new();
    if !filter.positions.is_empty() {
        filter_notes.push(format!(
            "positions {}",
            filter.positions.positions().collect::<Vec<_>>().join(",")
        ));
    }
    if filter.min_points.value() > 0.0 {
        filter_notes.push(format!("min {:.2} pts", filter.min_points.value()));
    }
    let detail_title = if filter_notes.is_empty() {
        "Player Weeks".to_string()
    } else {
        format!("Player Weeks ({})", filter_notes.join(", "))
    };

    let mut detail = Table::new(
        detail_title,
        vec![
            Column::integer("Week"),
            Column::text("Team"),
            Column::text("Player"),
            Column::text("Position"),
            Column::text("Slot"),
            Column::fixed2("Points"),
            Column::fixed2("Projected"),
            Column::fixed2("Diff"),
            Column::text("Opponent"),
            Column::integer("Opp Rank"),
        ],
    );
    for row in performance.detail(filter) {
        detail.push_row(vec![
            Cell::Integer(row.week.number() as i64),
            Cell::Text(row.team),
            Cell::Text(row.player),
            Cell::Text(row.position),
            Cell::Text(row.slot),
            Cell::Number(row.points),
            Cell::Number(row.projected),
            Cell::Number(row.diff),
            Cell::from(row.opponent),
            Cell::from(row.opponent_rank),
        ])?;
    }

    let mut totals = Table::new(
        "Season Totals by Player",
        vec![
            Column::text("Player"),
            Column::fixed2("Total Points"),
            Column::fixed2("Total Projected"),
            Column::integer("Weeks Played"),
        ],
    );
    for total in &performance.totals {
        totals.push_row(vec![
            Cell::text(total.player.clone()),
            Cell::Number(total.total_points),
            Cell::Number(total.total_projected),
            Cell::Integer(total.weeks_played as i64),
        ])?;
    }

    Ok(view
        .table(detail)
        .table(totals)
        .chart(bar_chart(&format!("Top {} Scorers", top_n), performance.top_scorers(top_n))))
}

fn card_title(card: &MatchupCard) -> String {
    let (home_mark, away_mark) = match card.winner {
        MatchupSide::Home => ("*", ""),
        MatchupSide::Away => ("", "*"),
    };
    format!(
        "Matchup {}: {}{} {:.2} vs {:.2} {}{} (margin {:.2})",
        card.index,
        home_mark,
        card.home.name,
        card.home.score,
        card.away.score,
        card.away.name,
        away_mark,
        card.margin
    )
}

fn lineup_table(title: String, lineup: &[league_analytics::LineupRow]) -> Result<Table> {
    let mut table = Table::new(
        title,
        vec![
            Column::text("Player"),
            Column::text("Slot"),
            Column::fixed2("Points"),
            Column::fixed2("Projected"),
        ],
    );
    for row in lineup {
        table.push_row(vec![
            Cell::text(row.player.clone()),
            Cell::text(row.slot.clone()),
            Cell::Number(row.points),
            Cell::Number(row.projected),
        ])?;
    }
    Ok(table)
}

/// Head-to-head matchups: metrics, cards (optionally with lineups) and summary
pub fn matchups_view(report: &MatchupReport, show_lineups: bool) -> Result<DashboardView> {
    let mut view = DashboardView::new(format!("Week {} Matchups", report.week));
    if report.is_empty() {
        view = view.notice(format!("No matchups found for week {}", report.week));
    }

    view = view.metrics(vec![
        Metric::new("Total Matchups", MetricValue::Integer(report.stats.matchup_count as i64)),
        Metric::new("Avg Home Score", MetricValue::from_option(report.stats.average_home)),
        Metric::new("Avg Away Score", MetricValue::from_option(report.stats.average_away)),
    ]);

    let mut cards = Table::new(
        "Matchups",
        vec![
            Column::integer("#"),
            Column::text("Home"),
            Column::fixed2("Home Score"),
            Column::text("Away"),
            Column::fixed2("Away Score"),
            Column::text("Winner"),
            Column::fixed2("Margin"),
        ],
    );
    for card in &report.cards {
        cards.push_row(vec![
            Cell::Integer(card.index as i64),
            Cell::text(card.home.name.clone()),
            Cell::Number(card.home.score),
            Cell::text(card.away.name.clone()),
            Cell::Number(card.away.score),
            Cell::text(card.winning_team().name.clone()),
            Cell::Number(card.margin),
        ])?;
    }
    view = view.table(cards);

    if show_lineups {
        for card in &report.cards {
            view = view.notice(card_title(card));
            view = view.table(lineup_table(format!("{} lineup", card.home.name), &card.home_lineup)?);
            view = view.table(lineup_table(format!("{} lineup", card.away.name), &card.away_lineup)?);
        }
    }

    let mut summary = Table::new(
        "Matchup Summary",
        vec![
            Column::text("Winner"),
            Column::fixed2("Winner Score"),
            Column::text("Loser"),
            Column::fixed2("Loser Score"),
            Column::fixed2("Margin"),
        ],
    );
    for row in &report.summary {
        summary.push_row(vec![
            Cell::text(row.winner.clone()),
            Cell::Number(row.winner_score),
            Cell::text(row.loser.clone()),
            Cell::Number(row.loser_score),
            Cell::Number(row.margin),
        ])?;
    }

    Ok(view.table(summary))
}

/// Teams of a season
pub fn teams_view(league: &League) -> Result<DashboardView> {
    let mut table = Table::new(
        format!("{} ({} teams)", league.name, league.teams().len()),
        vec![
            Column::integer("Id"),
            Column::text("Team"),
            Column::text("Abbrev"),
            Column::text("Owner"),
        ],
    );
    for team in league.teams() {
        table.push_row(vec![
            Cell::Integer(team.team_id as i64),
            Cell::text(team.name.clone()),
            Cell::text(team.abbreviation.clone()),
            Cell::from(team.owner.clone()),
        ])?;
    }

    Ok(DashboardView::new(format!("{} Season Teams", league.year))
        .metrics(vec![Metric::new("Current Week", MetricValue::Integer(league.current_week as i64))])
        .table(table))
}
