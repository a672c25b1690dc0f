//! Final score tiers

use serde::Serialize;

/// Result tier, a pure function of the percentage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    Excellent,
    Good,
    NeedsImprovement,
}

impl Tier {
    pub fn from_percentage(percentage: u32) -> Self {
        match percentage {
            80.. => Tier::Excellent,
            50..=79 => Tier::Good,
            _ => Tier::NeedsImprovement,
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            Tier::Excellent => "Xuất sắc! Bạn là chuyên gia an toàn số!",
            Tier::Good => "Khá tốt! Hãy trau dồi thêm nhé.",
            Tier::NeedsImprovement => "Cần cố gắng thêm!",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct QuizResults {
    pub score: u32,
    pub total: u32,
    pub percentage: u32,
    pub tier: Tier,
    pub message: &'static str,
}

impl QuizResults {
    /// Recompute everything from score and total alone
    pub fn from_score(score: u32, total: u32) -> Self {
        let percentage = percentage(score, total);
        let tier = Tier::from_percentage(percentage);
        Self {
            score,
            total,
            percentage,
            tier,
            message: tier.message(),
        }
    }
}

/// `round(score / total * 100)`, halves rounding up, in integer arithmetic
fn percentage(score: u32, total: u32) -> u32 {
    if total == 0 {
        return 0;
    }
    let (score, total) = (u64::from(score), u64::from(total));
    let rounded = (score * 200 + total) / (total * 2);
    u32::try_from(rounded).unwrap_or(u32::MAX)
}
