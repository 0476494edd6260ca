//! Role-tailored guidance notes
//!
//! Each role owns a fixed rule set that turns a window summary into six
//! notes. Every note is one of two pre-authored sentences, picked by a
//! threshold test. Presence is checked before any threshold: an absent
//! field always takes the "no concern" branch, while zero is a real value.

use serde::{Deserialize, Serialize};

use crate::config::Thresholds;
use crate::models::Role;
use crate::summary::Summary;

/// The six guidance notes shown next to the summary cards
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleNotes {
    pub activity: String,
    pub cardio: String,
    pub sleep: String,
    pub body: String,
    pub stress: String,
    pub blood_pressure: String,
}

impl RoleNotes {
    pub fn is_empty(&self) -> bool {
        self.entries().iter().all(|(_, note)| note.is_empty())
    }

    /// Notes paired with their display headings, in card order
    pub fn entries(&self) -> [(&'static str, &str); 6] {
        [
            ("Activity", self.activity.as_str()),
            ("Cardio", self.cardio.as_str()),
            ("Sleep", self.sleep.as_str()),
            ("Body", self.body.as_str()),
            ("Stress", self.stress.as_str()),
            ("Blood pressure", self.blood_pressure.as_str()),
        ]
    }
}

type NoteRules = fn(&Summary, &Thresholds) -> RoleNotes;

fn rules_for(role: Role) -> NoteRules {
    match role {
        Role::Coach => coach_notes,
        Role::Trainer => trainer_notes,
        Role::Doctor => doctor_notes,
        Role::Athlete => athlete_notes,
    }
}

/// Evaluate the role's rule set; all notes are empty without a summary
pub fn role_notes(role: Role, summary: Option<&Summary>, thresholds: &Thresholds) -> RoleNotes {
    match summary {
        Some(summary) => rules_for(role)(summary, thresholds),
        None => RoleNotes::default(),
    }
}

fn above(value: Option<f64>, limit: f64) -> bool {
    value.is_some_and(|v| v > limit)
}

fn below(value: Option<f64>, limit: f64) -> bool {
    value.is_some_and(|v| v < limit)
}

fn pick(condition: bool, when_true: &str, otherwise: &str) -> String {
    let note = if condition { when_true } else { otherwise };
    note.to_string()
}

fn coach_notes(summary: &Summary, t: &Thresholds) -> RoleNotes {
    let latest = &summary.latest;

    RoleNotes {
        activity: pick(
            above(summary.total_steps, t.coach_steps_high),
            "High activity load; consider a lighter session tomorrow.",
            "Moderate activity; room for higher intensity work.",
        ),
        cardio: pick(
            above(summary.avg_heart_rate, t.coach_hr_elevated),
            "Elevated average heart rate; monitor for fatigue.",
            "Cardio load within expected range.",
        ),
        sleep: pick(
            above(summary.apnea_events, 0.0),
            "Sleep quality impacted by apnea events; coordinate with medical staff.",
            "Sleep pattern supports current workload.",
        ),
        body: pick(
            below(latest.body_fat_pct, t.lean_body_fat),
            "Lean body composition; emphasize strength maintenance.",
            "Body composition balanced for role; maintain consistency.",
        ),
        stress: pick(
            above(summary.avg_stress, t.stress_high),
            "Training and life stress are accumulating; consider a recovery session.",
            "Stress within acceptable competitive range.",
        ),
        blood_pressure: "Escalate to medical staff if symptoms appear.".to_string(),
    }
}

fn trainer_notes(summary: &Summary, t: &Thresholds) -> RoleNotes {
    let latest = &summary.latest;

    RoleNotes {
        activity: pick(
            above(summary.total_active_minutes, t.trainer_active_minutes_high),
            "Sustained high active minutes; schedule mobility and recovery work.",
            "Active minutes can be increased gradually if needed.",
        ),
        cardio: pick(
            below(summary.avg_spo2, t.trainer_spo2_low),
            "Slightly reduced SpO2; prioritize breathing and recovery protocols.",
            "Oxygen saturation suitable for high-intensity sessions.",
        ),
        sleep: pick(
            below(summary.deep_sleep_pct(), t.trainer_deep_sleep_pct),
            "Deep sleep proportion is low; avoid heavy strength sessions.",
            "Sleep distribution supports progressive overload.",
        ),
        body: pick(
            above(latest.muscle_mass_kg, t.trainer_muscle_mass_kg),
            "Strong lean mass; maintain power and velocity work.",
            "Opportunity to build lean mass with structured strength blocks.",
        ),
        stress: pick(
            above(summary.avg_stress, t.stress_high),
            "Reduce neuromuscular load and emphasize technical drills.",
            "Stress profile compatible with current training density.",
        ),
        blood_pressure: "If blood pressure trends up, flag for doctor review.".to_string(),
    }
}

fn doctor_notes(summary: &Summary, t: &Thresholds) -> RoleNotes {
    let latest = &summary.latest;
    let hypertensive =
        above(latest.systolic_bp, t.systolic_high) || above(latest.diastolic_bp, t.diastolic_high);

    RoleNotes {
        activity: pick(
            above(summary.total_steps, t.doctor_steps_high),
            "Very high ambulatory volume; monitor for overuse injury risk.",
            "Ambulatory load within typical elite ranges.",
        ),
        cardio: pick(
            above(summary.avg_heart_rate, t.hr_high),
            &format!(
                "Average heart rate above {} bpm; evaluate for tachycardia causes.",
                t.hr_high
            ),
            "Cardiac metrics stable for current period.",
        ),
        sleep: pick(
            above(summary.apnea_events, t.apnea_events_high),
            "Frequent apnea events; consider formal sleep study referral.",
            "Sleep-related breathing appears within acceptable limits.",
        ),
        body: pick(
            above(latest.body_fat_pct, t.body_fat_high),
            "Body fat above target; discuss cardiometabolic risk profile.",
            "Body composition not currently elevating clinical risk.",
        ),
        stress: pick(
            above(summary.avg_stress, t.stress_high),
            "High perceived stress; screen for mood, recovery, and support needs.",
            "Perceived stress within expected competitive range.",
        ),
        blood_pressure: pick(
            hypertensive,
            "Blood pressure in hypertensive range; confirm and consider further workup.",
            "Blood pressure not currently in hypertensive range.",
        ),
    }
}

fn athlete_notes(summary: &Summary, t: &Thresholds) -> RoleNotes {
    let latest = &summary.latest;

    RoleNotes {
        activity: pick(
            above(summary.total_steps, t.athlete_steps_high),
            "You moved a lot today, great work. Protect recovery tonight.",
            "Solid base activity; you can safely push in key sessions.",
        ),
        cardio: pick(
            below(summary.avg_spo2, t.spo2_low),
            "Your oxygen levels dipped; focus on breathing and talk to staff if you feel off.",
            "Heart and oxygen numbers look good for training.",
        ),
        sleep: pick(
            above(summary.apnea_events, 0.0),
            "Your watch saw some breathing interruptions; mention this to the doctor.",
            "Your sleep pattern supports your performance goals.",
        ),
        body: pick(
            below(latest.body_fat_pct, t.lean_body_fat),
            "You are very lean; fuel enough around training.",
            "Body composition supports strength and durability.",
        ),
        stress: pick(
            above(summary.avg_stress, t.stress_high),
            "You're carrying a lot of stress; build in short recovery breaks today.",
            "Your stress looks under control; keep your current routines.",
        ),
        blood_pressure: "If you ever feel dizzy or unwell, tell staff immediately.".to_string(),
    }
}
