//! Fixed advisor copy: personas, greetings, error text, quick prompts

use serde::Serialize;

/// Persona for the session created at startup
pub const SYSTEM_INSTRUCTION: &str = "Bạn là Cố vấn An toàn Số (Cyber Safety Advisor), một chuyên gia thân thiện, dễ hiểu dành cho mọi lứa tuổi (đặc biệt là học sinh, sinh viên).
Nhiệm vụ của bạn là giải đáp thắc mắc về bảo mật, an toàn mạng, phòng tránh lừa đảo, và văn hóa ứng xử trên không gian mạng.
Hãy dùng emoji 🛡️, 🔒, 💡 để làm sinh động cuộc trò chuyện.
Trả lời ngắn gọn, súc tích, đi thẳng vào vấn đề.";

/// Persona for sessions created by a reset
pub const RESET_SYSTEM_INSTRUCTION: &str =
    "Bạn là Cố vấn An toàn Số. Hãy trả lời ngắn gọn, thân thiện.";

pub const WELCOME_ID: &str = "welcome";

pub const WELCOME_MESSAGE: &str = "Xin chào! Tớ là **Cố vấn An toàn Số**. \n\nTớ ở đây để giúp cậu:\n- 🛡️ Bảo mật thông tin cá nhân\n- 🚫 Phòng tránh lừa đảo trực tuyến\n- 🧠 Kiểm tra kiến thức qua các bài Quiz thú vị!\n\nCậu đang quan tâm đến vấn đề gì thế?";

pub const RESET_GREETING: &str =
    "Chúng mình đã bắt đầu lại. Cậu cần tư vấn về điều gì mới không?";

/// Replaces the in-flight reply when its stream fails
pub const STREAM_ERROR_TEXT: &str =
    "Xin lỗi, tớ đang gặp chút trục trặc khi kết nối. Cậu thử lại sau nhé!";

pub const RESET_CONFIRMATION: &str =
    "Cậu có chắc muốn xóa cuộc trò chuyện và bắt đầu lại không?";

/// A canned question offered for one-tap submission
#[derive(Debug, Clone, Copy, Serialize)]
pub struct QuickPrompt {
    pub id: &'static str,
    pub label: &'static str,
    pub prompt: &'static str,
}

pub const QUICK_PROMPTS: [QuickPrompt; 5] = [
    QuickPrompt {
        id: "1",
        label: "Mật khẩu mạnh",
        prompt: "Làm thế nào để tạo một mật khẩu mạnh và dễ nhớ?",
    },
    QuickPrompt {
        id: "2",
        label: "Lừa đảo Phishing",
        prompt: "Dấu hiệu nhận biết các trang web và email lừa đảo là gì?",
    },
    QuickPrompt {
        id: "3",
        label: "Bảo mật FB",
        prompt: "Hướng dẫn tớ cách bảo mật tài khoản mạng xã hội 2 lớp.",
    },
    QuickPrompt {
        id: "4",
        label: "Lộ thông tin",
        prompt: "Làm sao để kiểm tra xem thông tin cá nhân của tớ có bị lộ không?",
    },
    QuickPrompt {
        id: "5",
        label: "Quyền riêng tư",
        prompt: "Cài đặt quyền riêng tư trên điện thoại như thế nào là an toàn?",
    },
];

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_quick_prompts_are_distinct_and_submittable() {
        let ids: HashSet<_> = QUICK_PROMPTS.iter().map(|p| p.id).collect();
        assert_eq!(ids.len(), QUICK_PROMPTS.len());
        assert!(QUICK_PROMPTS.iter().all(|p| !p.prompt.trim().is_empty()));
    }
}
