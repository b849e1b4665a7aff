//! The eight crash analyses.
//!
//! Each analysis is a pure function of the [`CrashContext`] that returns the
//! result dataset and a summary. None of them writes anywhere; the engine
//! forwards the result to the sink.

use crate::context::CrashContext;
use crate::dataset::{Dataset, Value};
use crate::error::{AnalyticsError, Result};
use crate::expr::{col, Expr};
use crate::operators::{Aggregate, Derive, JoinKind, Order, RankWindow, Ranking, COUNT_COLUMN};
use crash_domain::columns::{charge, damage, person, unit, CRASH_ID};
use crash_domain::{category, sentinel, AnalysisId};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Per-row casualty count derived from the unit injury and death counts.
pub const TOT_CASUALTIES_CNT: &str = "TOT_CASUALTIES_CNT";
/// Casualty total per vehicle make.
pub const TOT_CASUALTIES_CNT_AGG: &str = "TOT_CASUALTIES_CNT_AGG";
/// Rank helper column of the per-body-style leaderboard.
pub const ROW_COLUMN: &str = "row";

/// Makes ranked 6th through 15th: the ten after the top five.
pub const INJURY_MAKES_WINDOW: RankWindow = RankWindow::positions(6, 15);
pub const TOP_ZIP_CODES: usize = 5;
pub const TOP_LICENSE_STATES: usize = 25;
pub const TOP_COLORS: usize = 10;
pub const TOP_SPEEDING_MAKES: usize = 5;

/// How vehicle damage scale values are compared with `"DAMAGED 4"`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DamageScaleComparison {
    /// Plain string comparison, so `"NO DAMAGE"` also sorts above the bound
    /// and is only excluded by the sentinel list.
    #[default]
    Lexicographic,
    /// Compare the level number embedded in the value.
    Numeric,
}

/// Switches for behaviors whose intended semantics are ambiguous.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisOptions {
    pub damage_scale_comparison: DamageScaleComparison,
    /// De-duplicate the crash id list of analysis 7.
    pub distinct_crash_ids: bool,
}

/// Scalar or collection answer of one analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Summary {
    Count(usize),
    Value(Value),
    List(Vec<Value>),
    /// The result dataset is the answer.
    Table,
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Count(n) => write!(f, "{n}"),
            Self::Value(v) => write!(f, "{v}"),
            Self::List(values) => {
                f.write_str("[")?;
                for (i, v) in values.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{v}")?;
                }
                f.write_str("]")
            }
            Self::Table => f.write_str("(table)"),
        }
    }
}

/// Result dataset plus summary.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisOutput {
    pub dataset: Dataset,
    pub summary: Summary,
}

impl AnalysisOutput {
    pub fn new(dataset: Dataset, summary: Summary) -> Self {
        Self { dataset, summary }
    }
}

/// Run one analysis against `ctx`.
pub fn evaluate(id: AnalysisId, ctx: &CrashContext, options: &AnalysisOptions) -> Result<AnalysisOutput> {
    match id {
        AnalysisId::MaleFatalities => male_fatality_count(ctx),
        AnalysisId::TwoWheelers => two_wheeler_count(ctx),
        AnalysisId::FemaleAccidentState => female_accident_state(ctx),
        AnalysisId::InjuryMakesWindow => injury_makes_window(ctx),
        AnalysisId::EthnicityByBodyStyle => top_ethnicity_per_body_style(ctx),
        AnalysisId::AlcoholZipCodes => alcohol_zip_codes(ctx),
        AnalysisId::UndamagedPropertyCrashes => undamaged_property_crashes(ctx, options),
        AnalysisId::SpeedingMakes => speeding_makes(ctx),
    }
}

/// 1. Persons killed who are male.
pub fn male_fatality_count(ctx: &CrashContext) -> Result<AnalysisOutput> {
    let killed = ctx.primary_person().filter(
        &col(person::PRSN_GNDR_ID)
            .eq(category::MALE)
            .and(col(person::PRSN_INJRY_SEV_ID).eq(category::KILLED)),
    )?;
    let count = killed.len();
    Ok(AnalysisOutput::new(killed, Summary::Count(count)))
}

/// 2. Units whose body style mentions a motorcycle, police motorcycles
/// included.
pub fn two_wheeler_count(ctx: &CrashContext) -> Result<AnalysisOutput> {
    let two_wheelers = ctx
        .units()
        .filter(&col(unit::VEH_BODY_STYL_ID).contains(category::MOTORCYCLE))?;
    let count = two_wheelers.len();
    Ok(AnalysisOutput::new(two_wheelers, Summary::Count(count)))
}

/// 3. Driver license state with the most female participants.
pub fn female_accident_state(ctx: &CrashContext) -> Result<AnalysisOutput> {
    let by_state = ctx
        .primary_person()
        .filter(&col(person::PRSN_GNDR_ID).eq(category::FEMALE))?
        .group_by(&[person::DRVR_LIC_STATE_ID], &Aggregate::Count)?
        .order_by(COUNT_COLUMN, Order::Descending)?;

    let state = by_state
        .first_value(person::DRVR_LIC_STATE_ID)?
        .ok_or(AnalyticsError::EmptyResult(AnalysisId::FemaleAccidentState))?;
    Ok(AnalysisOutput::new(by_state, Summary::Value(state)))
}

/// 4. Vehicle makes ranked 6th to 15th by injuries plus deaths.
pub fn injury_makes_window(ctx: &CrashContext) -> Result<AnalysisOutput> {
    let window = ctx
        .units()
        .filter(&col(unit::VEH_MAKE_ID).ne(sentinel::NA))?
        .with_column(
            TOT_CASUALTIES_CNT,
            &Derive::Sum(vec![unit::TOT_INJRY_CNT.into(), unit::DEATH_CNT.into()]),
        )?
        .group_by(
            &[unit::VEH_MAKE_ID],
            &Aggregate::sum(TOT_CASUALTIES_CNT, TOT_CASUALTIES_CNT_AGG),
        )?
        .rank_window(TOT_CASUALTIES_CNT_AGG, Order::Descending, &INJURY_MAKES_WINDOW)?;

    let makes = window.column_values(unit::VEH_MAKE_ID)?;
    Ok(AnalysisOutput::new(window, Summary::List(makes)))
}

/// 5. Most frequent known ethnicity for every known body style.
pub fn top_ethnicity_per_body_style(ctx: &CrashContext) -> Result<AnalysisOutput> {
    let leaders = ctx
        .units()
        .join(ctx.primary_person(), CRASH_ID, JoinKind::Inner)?
        .filter(
            &col(unit::VEH_BODY_STYL_ID)
                .is_in(sentinel::BODY_STYLE_UNKNOWNS.iter().copied())
                .not()
                .and(
                    col(person::PRSN_ETHNICITY_ID)
                        .is_in(sentinel::ETHNICITY_UNKNOWNS.iter().copied())
                        .not(),
                ),
        )?
        .group_by(
            &[unit::VEH_BODY_STYL_ID, person::PRSN_ETHNICITY_ID],
            &Aggregate::Count,
        )?
        .partitioned_rank(
            &[unit::VEH_BODY_STYL_ID],
            COUNT_COLUMN,
            Order::Descending,
            Ranking::RowNumber,
            ROW_COLUMN,
        )?
        .filter(&col(ROW_COLUMN).eq(1_i64))?
        .drop_columns(&[ROW_COLUMN, COUNT_COLUMN])?;

    Ok(AnalysisOutput::new(leaders, Summary::Table))
}

/// 6. Driver zip codes with the most crashes where alcohol contributed.
pub fn alcohol_zip_codes(ctx: &CrashContext) -> Result<AnalysisOutput> {
    let alcohol = col(unit::CONTRIB_FACTR_1_ID)
        .contains(category::ALCOHOL)
        .or(col(unit::CONTRIB_FACTR_2_ID).contains(category::ALCOHOL));

    let top = ctx
        .units()
        .join(ctx.primary_person(), CRASH_ID, JoinKind::Inner)?
        .filter(&col(person::DRVR_ZIP).ne(sentinel::NA).and(alcohol))?
        .group_by(&[person::DRVR_ZIP], &Aggregate::Count)?
        .top_k(TOP_ZIP_CODES, COUNT_COLUMN, Order::Descending)?;

    let zips = top.column_values(person::DRVR_ZIP)?;
    Ok(AnalysisOutput::new(top, Summary::List(zips)))
}

/// 7. Crashes with no damaged property, a vehicle damaged above level 4 and
/// proof of liability insurance.
pub fn undamaged_property_crashes(
    ctx: &CrashContext,
    options: &AnalysisOptions,
) -> Result<AnalysisOutput> {
    let crashes = ctx
        .damages()
        .join(ctx.units(), CRASH_ID, JoinKind::Inner)?
        .filter(
            &damage_above_level_4(unit::VEH_DMAG_SCL_1_ID, options.damage_scale_comparison)
                .or(damage_above_level_4(
                    unit::VEH_DMAG_SCL_2_ID,
                    options.damage_scale_comparison,
                ))
                .and(col(damage::DAMAGED_PROPERTY).eq(category::NONE))
                .and(col(unit::FIN_RESP_TYPE_ID).eq(category::PROOF_OF_LIABILITY_INSURANCE)),
        )?;

    let mut ids = crashes.column_values(CRASH_ID)?;
    if options.distinct_crash_ids {
        let mut seen = HashSet::new();
        ids.retain(|id| seen.insert(id.clone()));
    }
    Ok(AnalysisOutput::new(crashes, Summary::List(ids)))
}

fn damage_above_level_4(column: &str, comparison: DamageScaleComparison) -> Expr {
    let above = match comparison {
        DamageScaleComparison::Lexicographic => col(column).gt(category::DAMAGED_4),
        DamageScaleComparison::Numeric => col(column).level_gt(4),
    };
    above.and(
        col(column)
            .is_in(sentinel::DAMAGE_SCALE_UNKNOWNS.iter().copied())
            .not(),
    )
}

/// 8. Top makes among speeding charges with licensed drivers, a top 10
/// colour and a top 25 license state.
///
/// The state ranking only counts values that do not cast to an integer,
/// nulls included, rather than ranking states by offences.
pub fn speeding_makes(ctx: &CrashContext) -> Result<AnalysisOutput> {
    let top_states = ctx
        .units()
        .filter(&col(unit::VEH_LIC_STATE_ID).not_integer())?
        .group_by(&[unit::VEH_LIC_STATE_ID], &Aggregate::Count)?
        .top_k(TOP_LICENSE_STATES, COUNT_COLUMN, Order::Descending)?
        .column_values(unit::VEH_LIC_STATE_ID)?;

    let top_colors = ctx
        .units()
        .filter(&col(unit::VEH_COLOR_ID).ne(sentinel::NA))?
        .group_by(&[unit::VEH_COLOR_ID], &Aggregate::Count)?
        .top_k(TOP_COLORS, COUNT_COLUMN, Order::Descending)?
        .column_values(unit::VEH_COLOR_ID)?;

    let top = ctx
        .charges()
        .join(ctx.primary_person(), CRASH_ID, JoinKind::Inner)?
        .join(ctx.units(), CRASH_ID, JoinKind::Inner)?
        .filter(
            &col(charge::CHARGE)
                .contains(category::SPEED)
                .and(col(person::DRVR_LIC_TYPE_ID).is_in(category::LICENSED_TYPES.iter().copied()))
                .and(col(unit::VEH_COLOR_ID).is_in(top_colors))
                .and(col(unit::VEH_LIC_STATE_ID).is_in(top_states)),
        )?
        .group_by(&[unit::VEH_MAKE_ID], &Aggregate::Count)?
        .top_k(TOP_SPEEDING_MAKES, COUNT_COLUMN, Order::Descending)?;

    let makes = top.column_values(unit::VEH_MAKE_ID)?;
    Ok(AnalysisOutput::new(top, Summary::List(makes)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crash_domain::DatasetKind;

    fn v(s: &str) -> Value {
        Value::from(s)
    }

    fn dataset(columns: &[&str], rows: Vec<Vec<Value>>) -> Dataset {
        Dataset::new("test", columns.iter().map(ToString::to_string).collect(), rows).unwrap()
    }

    const PERSON_COLUMNS: [&str; 7] = [
        CRASH_ID,
        person::PRSN_GNDR_ID,
        person::PRSN_INJRY_SEV_ID,
        person::PRSN_ETHNICITY_ID,
        person::DRVR_LIC_STATE_ID,
        person::DRVR_LIC_TYPE_ID,
        person::DRVR_ZIP,
    ];

    fn people(rows: &[(&str, &str, &str, &str, &str, &str, &str)]) -> Dataset {
        dataset(
            &PERSON_COLUMNS,
            rows.iter()
                .map(|r| vec![v(r.0), v(r.1), v(r.2), v(r.3), v(r.4), v(r.5), v(r.6)])
                .collect(),
        )
    }

    /// Units with crash id, make, body style, colour, license state and the
    /// contributing factors; everything else defaults. An empty state is a
    /// null cell.
    struct UnitRow<'a> {
        crash: &'a str,
        make: &'a str,
        style: &'a str,
        color: &'a str,
        state: &'a str,
        factor_1: &'a str,
        injuries: &'a str,
        deaths: &'a str,
        scale_1: &'a str,
        scale_2: &'a str,
        insurance: &'a str,
    }

    impl Default for UnitRow<'_> {
        fn default() -> Self {
            Self {
                crash: "1",
                make: "FORD",
                style: "PASSENGER CAR, 4-DOOR",
                color: "BLK",
                state: "TX",
                factor_1: "NONE",
                injuries: "0",
                deaths: "0",
                scale_1: "NA",
                scale_2: "NA",
                insurance: "NA",
            }
        }
    }

    fn units(rows: &[UnitRow<'_>]) -> Dataset {
        dataset(
            &[
                CRASH_ID,
                unit::VEH_MAKE_ID,
                unit::VEH_BODY_STYL_ID,
                unit::VEH_COLOR_ID,
                unit::VEH_LIC_STATE_ID,
                unit::CONTRIB_FACTR_1_ID,
                unit::CONTRIB_FACTR_2_ID,
                unit::TOT_INJRY_CNT,
                unit::DEATH_CNT,
                unit::VEH_DMAG_SCL_1_ID,
                unit::VEH_DMAG_SCL_2_ID,
                unit::FIN_RESP_TYPE_ID,
            ],
            rows.iter()
                .map(|r| {
                    vec![
                        v(r.crash),
                        v(r.make),
                        v(r.style),
                        v(r.color),
                        if r.state.is_empty() { Value::Null } else { v(r.state) },
                        v(r.factor_1),
                        v("NONE"),
                        v(r.injuries),
                        v(r.deaths),
                        v(r.scale_1),
                        v(r.scale_2),
                        v(r.insurance),
                    ]
                })
                .collect(),
        )
    }

    fn context(kind: DatasetKind, ds: Dataset) -> CrashContext {
        CrashContext::new().with_dataset(kind, ds)
    }

    #[test]
    fn test_male_fatality_count() {
        let ctx = context(
            DatasetKind::PrimaryPerson,
            people(&[
                ("1", "MALE", "KILLED", "WHITE", "Texas", "DRIVER LICENSE", "75001"),
                ("2", "MALE", "INJURED", "WHITE", "Texas", "DRIVER LICENSE", "75001"),
                ("3", "FEMALE", "KILLED", "WHITE", "Texas", "DRIVER LICENSE", "75001"),
            ]),
        );
        let out = male_fatality_count(&ctx).unwrap();
        assert_eq!(out.summary, Summary::Count(1));
        assert_eq!(out.dataset.len(), 1);
    }

    #[test]
    fn test_two_wheeler_count() {
        let ctx = context(
            DatasetKind::Units,
            units(&[
                UnitRow { style: "MOTORCYCLE", ..UnitRow::default() },
                UnitRow { style: "POLICE MOTORCYCLE", ..UnitRow::default() },
                UnitRow { style: "PASSENGER CAR", ..UnitRow::default() },
            ]),
        );
        assert_eq!(two_wheeler_count(&ctx).unwrap().summary, Summary::Count(2));
    }

    #[test]
    fn test_female_accident_state() {
        let ctx = context(
            DatasetKind::PrimaryPerson,
            people(&[
                ("1", "FEMALE", "NA", "WHITE", "Texas", "NA", "1"),
                ("2", "FEMALE", "NA", "WHITE", "Oklahoma", "NA", "1"),
                ("3", "FEMALE", "NA", "WHITE", "Texas", "NA", "1"),
                ("4", "MALE", "NA", "WHITE", "Oklahoma", "NA", "1"),
                ("5", "MALE", "NA", "WHITE", "Oklahoma", "NA", "1"),
            ]),
        );
        let out = female_accident_state(&ctx).unwrap();
        assert_eq!(out.summary, Summary::Value(v("Texas")));
        assert_eq!(out.dataset.len(), 2);
    }

    #[test]
    fn test_female_accident_state_without_females_is_an_error() {
        let ctx = context(
            DatasetKind::PrimaryPerson,
            people(&[("1", "MALE", "KILLED", "WHITE", "Texas", "NA", "1")]),
        );
        let err = female_accident_state(&ctx).unwrap_err();
        assert!(matches!(
            err,
            AnalyticsError::EmptyResult(AnalysisId::FemaleAccidentState)
        ));
    }

    #[test]
    fn test_injury_makes_window() {
        let names: Vec<String> = (0..18).map(|i| format!("MAKE{i:02}")).collect();
        let injuries: Vec<String> = (0..18).map(|i| (100 - i * 2).to_string()).collect();
        let mut rows: Vec<UnitRow<'_>> = names
            .iter()
            .zip(&injuries)
            .map(|(make, inj)| UnitRow {
                make,
                injuries: inj,
                deaths: "1",
                ..UnitRow::default()
            })
            .collect();
        rows.push(UnitRow { make: "NA", injuries: "500", ..UnitRow::default() });
        let ctx = context(DatasetKind::Units, units(&rows));

        let out = injury_makes_window(&ctx).unwrap();
        let expected: Vec<Value> = names[5..15].iter().map(|n| v(n)).collect();
        assert_eq!(out.summary, Summary::List(expected));
        assert_eq!(
            out.dataset.columns(),
            &[unit::VEH_MAKE_ID, TOT_CASUALTIES_CNT_AGG]
        );
        assert_eq!(out.dataset.first_value(TOT_CASUALTIES_CNT_AGG).unwrap(), Some(Value::Int(91)));
    }

    #[test]
    fn test_top_ethnicity_per_body_style() {
        let ctx = CrashContext::new()
            .with_dataset(
                DatasetKind::Units,
                units(&[
                    UnitRow { crash: "1", style: "SPORT UTILITY VEHICLE", ..UnitRow::default() },
                    UnitRow { crash: "2", style: "SPORT UTILITY VEHICLE", ..UnitRow::default() },
                    UnitRow { crash: "3", style: "PICKUP", ..UnitRow::default() },
                    UnitRow { crash: "4", style: "UNKNOWN", ..UnitRow::default() },
                ]),
            )
            .with_dataset(
                DatasetKind::PrimaryPerson,
                people(&[
                    ("1", "MALE", "NA", "HISPANIC", "Texas", "NA", "1"),
                    ("1", "MALE", "NA", "WHITE", "Texas", "NA", "1"),
                    ("2", "MALE", "NA", "HISPANIC", "Texas", "NA", "1"),
                    ("3", "MALE", "NA", "UNKNOWN", "Texas", "NA", "1"),
                    ("3", "MALE", "NA", "BLACK", "Texas", "NA", "1"),
                    ("4", "MALE", "NA", "WHITE", "Texas", "NA", "1"),
                ]),
            );

        let out = top_ethnicity_per_body_style(&ctx).unwrap();
        assert_eq!(out.summary, Summary::Table);
        assert_eq!(
            out.dataset.columns(),
            &[unit::VEH_BODY_STYL_ID, person::PRSN_ETHNICITY_ID]
        );
        let rows: Vec<Vec<Value>> = out.dataset.rows().iter().map(|r| r.to_vec()).collect();
        assert_eq!(
            rows,
            vec![
                vec![v("PICKUP"), v("BLACK")],
                vec![v("SPORT UTILITY VEHICLE"), v("HISPANIC")],
            ]
        );
    }

    #[test]
    fn test_alcohol_zip_codes() {
        let zips = ["75001", "75002", "75003", "75004", "75005", "75006"];
        let crashes_per_zip = [10, 9, 8, 7, 6, 1];

        let mut unit_rows = Vec::new();
        let mut person_rows = Vec::new();
        let mut crash_ids = Vec::new();
        for (zip, n) in zips.iter().zip(crashes_per_zip) {
            for i in 0..n {
                crash_ids.push((format!("{zip}-{i}"), *zip));
            }
        }
        for (id, zip) in &crash_ids {
            unit_rows.push(UnitRow {
                crash: id,
                factor_1: "UNDER INFLUENCE - ALCOHOL",
                ..UnitRow::default()
            });
            person_rows.push((id.as_str(), "MALE", "NA", "WHITE", "Texas", "NA", *zip));
        }
        // Alcohol-free crash and an unrecorded zip never count.
        unit_rows.push(UnitRow { crash: "sober", ..UnitRow::default() });
        person_rows.push(("sober", "MALE", "NA", "WHITE", "Texas", "NA", "75006"));
        unit_rows.push(UnitRow { crash: "nozip", factor_1: "HAD BEEN DRINKING ALCOHOL", ..UnitRow::default() });
        person_rows.push(("nozip", "MALE", "NA", "WHITE", "Texas", "NA", "NA"));

        let ctx = CrashContext::new()
            .with_dataset(DatasetKind::Units, units(&unit_rows))
            .with_dataset(DatasetKind::PrimaryPerson, people(&person_rows));

        let out = alcohol_zip_codes(&ctx).unwrap();
        assert_eq!(
            out.summary,
            Summary::List(zips[..5].iter().map(|z| v(z)).collect())
        );
        assert_eq!(
            out.dataset.column_values(COUNT_COLUMN).unwrap(),
            vec![Value::Int(10), Value::Int(9), Value::Int(8), Value::Int(7), Value::Int(6)]
        );
    }

    fn damage_context() -> CrashContext {
        let damages = dataset(
            &[CRASH_ID, damage::DAMAGED_PROPERTY],
            vec![
                vec![v("1"), v("NONE")],
                vec![v("1"), v("NONE")],
                vec![v("2"), v("NONE")],
                vec![v("3"), v("FENCE")],
                vec![v("4"), v("NONE")],
                vec![v("5"), v("NONE")],
            ],
        );
        let insured = "PROOF OF LIABILITY INSURANCE";
        let units = units(&[
            UnitRow { crash: "1", scale_1: "DAMAGED 5", insurance: insured, ..UnitRow::default() },
            UnitRow { crash: "2", scale_1: "NO DAMAGE", scale_2: "DAMAGED 6", insurance: insured, ..UnitRow::default() },
            UnitRow { crash: "3", scale_1: "DAMAGED 7 HIGHEST", insurance: insured, ..UnitRow::default() },
            UnitRow { crash: "4", scale_1: "DAMAGED 4", insurance: insured, ..UnitRow::default() },
            UnitRow { crash: "5", scale_1: "DAMAGED 6", insurance: "NA", ..UnitRow::default() },
        ]);
        CrashContext::new()
            .with_dataset(DatasetKind::Damages, damages)
            .with_dataset(DatasetKind::Units, units)
    }

    #[test]
    fn test_undamaged_property_crashes_keeps_duplicates() {
        let out = undamaged_property_crashes(&damage_context(), &AnalysisOptions::default()).unwrap();
        assert_eq!(out.summary, Summary::List(vec![v("1"), v("1"), v("2")]));
    }

    #[test]
    fn test_undamaged_property_crashes_distinct_and_numeric() {
        let options = AnalysisOptions {
            damage_scale_comparison: DamageScaleComparison::Numeric,
            distinct_crash_ids: true,
        };
        let out = undamaged_property_crashes(&damage_context(), &options).unwrap();
        assert_eq!(out.summary, Summary::List(vec![v("1"), v("2")]));
        assert_eq!(out.dataset.len(), 3);
    }

    #[test]
    fn test_speeding_makes() {
        let charges = dataset(
            &[CRASH_ID, charge::CHARGE],
            vec![
                vec![v("1"), v("SPEEDING 10% OVER")],
                vec![v("2"), v("UNSAFE SPEED")],
                vec![v("3"), v("SPEEDING")],
                vec![v("4"), v("FAILED TO YIELD")],
                vec![v("5"), v("SPEEDING")],
                vec![v("6"), v("SPEEDING")],
            ],
        );
        let person_rows = [
            ("1", "MALE", "NA", "WHITE", "Texas", "DRIVER LICENSE", "1"),
            ("2", "MALE", "NA", "WHITE", "Texas", "COMMERCIAL DRIVER LIC.", "1"),
            ("3", "MALE", "NA", "WHITE", "Texas", "DRIVER LICENSE", "1"),
            ("4", "MALE", "NA", "WHITE", "Texas", "DRIVER LICENSE", "1"),
            ("5", "MALE", "NA", "WHITE", "Texas", "UNLICENSED", "1"),
            ("6", "MALE", "NA", "WHITE", "Texas", "DRIVER LICENSE", "1"),
        ];
        let units = units(&[
            UnitRow { crash: "1", make: "FORD", ..UnitRow::default() },
            UnitRow { crash: "2", make: "FORD", ..UnitRow::default() },
            UnitRow { crash: "3", make: "TOYOTA", ..UnitRow::default() },
            UnitRow { crash: "4", make: "HONDA", ..UnitRow::default() },
            UnitRow { crash: "5", make: "KIA", ..UnitRow::default() },
            // Numeric license state is outside the top 25 state set.
            UnitRow { crash: "6", make: "DODGE", state: "98", ..UnitRow::default() },
        ]);
        let ctx = CrashContext::new()
            .with_dataset(DatasetKind::Charges, charges)
            .with_dataset(DatasetKind::PrimaryPerson, people(&person_rows))
            .with_dataset(DatasetKind::Units, units);

        let out = speeding_makes(&ctx).unwrap();
        assert_eq!(out.summary, Summary::List(vec![v("FORD"), v("TOYOTA")]));
    }

    #[test]
    fn test_analyses_are_deterministic() {
        let ctx = damage_context()
            .with_dataset(
                DatasetKind::PrimaryPerson,
                people(&[
                    ("1", "FEMALE", "NA", "WHITE", "Texas", "DRIVER LICENSE", "75001"),
                    ("2", "MALE", "KILLED", "HISPANIC", "Texas", "DRIVER LICENSE", "75002"),
                    ("3", "FEMALE", "NA", "BLACK", "Oklahoma", "DRIVER LICENSE", "75003"),
                ]),
            )
            .with_dataset(
                DatasetKind::Charges,
                dataset(&[CRASH_ID, charge::CHARGE], vec![vec![v("1"), v("SPEEDING")]]),
            );
        let options = AnalysisOptions::default();

        for id in AnalysisId::ALL {
            let first = evaluate(id, &ctx, &options).map_err(|e| e.to_string());
            let second = evaluate(id, &ctx, &options).map_err(|e| e.to_string());
            assert!(first.is_ok(), "analysis {id} failed: {first:?}");
            assert_eq!(first, second, "analysis {id} is not deterministic");
        }
    }

    #[test]
    fn test_top_ethnicity_tie_goes_to_first_ethnicity() {
        let ctx = CrashContext::new()
            .with_dataset(
                DatasetKind::Units,
                units(&[UnitRow { crash: "1", style: "SUV", ..UnitRow::default() }]),
            )
            .with_dataset(
                DatasetKind::PrimaryPerson,
                people(&[
                    ("1", "MALE", "NA", "WHITE", "Texas", "NA", "1"),
                    ("1", "MALE", "NA", "BLACK", "Texas", "NA", "1"),
                    ("1", "MALE", "NA", "ASIAN", "Texas", "NA", "1"),
                ]),
            );

        let out = top_ethnicity_per_body_style(&ctx).unwrap();
        let rows: Vec<Vec<Value>> = out.dataset.rows().iter().map(|r| r.to_vec()).collect();
        assert_eq!(rows, vec![vec![v("SUV"), v("ASIAN")]]);
    }

    #[test]
    fn test_female_accident_state_can_be_null() {
        let female = |crash: &str, state: Option<&str>| {
            vec![v(crash), v("FEMALE"), v("NA"), v("WHITE"), Value::from(state), v("NA"), v("1")]
        };
        let ctx = context(
            DatasetKind::PrimaryPerson,
            dataset(
                &PERSON_COLUMNS,
                vec![female("1", None), female("2", Some("Texas")), female("3", None)],
            ),
        );

        let out = female_accident_state(&ctx).unwrap();
        assert_eq!(out.summary, Summary::Value(Value::Null));
        assert_eq!(out.dataset.first_value(COUNT_COLUMN).unwrap(), Some(Value::Int(2)));
    }

    #[test]
    fn test_speeding_makes_never_match_null_states() {
        let charges = dataset(
            &[CRASH_ID, charge::CHARGE],
            vec![vec![v("1"), v("SPEEDING")], vec![v("2"), v("SPEEDING")]],
        );
        let person_rows = [
            ("1", "MALE", "NA", "WHITE", "Texas", "DRIVER LICENSE", "1"),
            ("2", "MALE", "NA", "WHITE", "Texas", "DRIVER LICENSE", "1"),
        ];
        // The null state ranks among the top states but never satisfies IN.
        let units = units(&[
            UnitRow { crash: "1", make: "KIA", state: "", ..UnitRow::default() },
            UnitRow { crash: "2", make: "FORD", ..UnitRow::default() },
        ]);
        let ctx = CrashContext::new()
            .with_dataset(DatasetKind::Charges, charges)
            .with_dataset(DatasetKind::PrimaryPerson, people(&person_rows))
            .with_dataset(DatasetKind::Units, units);

        let out = speeding_makes(&ctx).unwrap();
        assert_eq!(out.summary, Summary::List(vec![v("FORD")]));
        assert_eq!(out.dataset.first_value(COUNT_COLUMN).unwrap(), Some(Value::Int(1)));
    }

    #[test]
    fn test_summary_display() {
        assert_eq!(Summary::Count(3).to_string(), "3");
        assert_eq!(Summary::List(vec![v("A"), v("B")]).to_string(), "[A, B]");
        assert_eq!(Summary::Value(Value::Null).to_string(), "null");
    }

    #[test]
    fn test_options_deserialize_with_defaults() {
        let options: AnalysisOptions =
            serde_json::from_str(r#"{"damage_scale_comparison": "numeric"}"#).unwrap();
        assert_eq!(options.damage_scale_comparison, DamageScaleComparison::Numeric);
        assert!(!options.distinct_crash_ids);
    }
}
