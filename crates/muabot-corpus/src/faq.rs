//! Seed FAQ set.
//!
//! There is no FAQ table in the system of record; these question/answer
//! pairs are owned by the pipeline and appended to every corpus build.

/// One seeded question/answer pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FaqEntry {
    pub question: &'static str,
    pub answer: &'static str,
}

/// The fixed FAQ seed, in corpus order. Document ids are `faq_{index}`.
#[must_use]
pub fn seed_faqs() -> &'static [FaqEntry] {
    const FAQS: [FaqEntry; 5] = [
        FaqEntry {
            question: "Làm thế nào để đặt hàng?",
            answer: "Bạn có thể đặt hàng bằng cách thêm sản phẩm vào giỏ hàng và tiến hành thanh toán. Chúng tôi hỗ trợ thanh toán COD và VNPay.",
        },
        FaqEntry {
            question: "Thời gian giao hàng là bao lâu?",
            answer: "Thời gian giao hàng thường từ 3-5 ngày làm việc tùy thuộc vào địa chỉ của bạn.",
        },
        FaqEntry {
            question: "Có hỗ trợ đổi trả không?",
            answer: "Có, chúng tôi hỗ trợ đổi trả trong vòng 7 ngày kể từ khi nhận hàng nếu sản phẩm còn nguyên vẹn.",
        },
        FaqEntry {
            question: "Làm sao để theo dõi đơn hàng?",
            answer: "Bạn có thể theo dõi đơn hàng trong phần 'Đơn hàng' của tài khoản hoặc liên hệ hotline để được hỗ trợ.",
        },
        FaqEntry {
            question: "Có miễn phí vận chuyển không?",
            answer: "Chúng tôi có chương trình miễn phí vận chuyển cho đơn hàng trên 500.000 VNĐ.",
        },
    ];
    &FAQS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn five_entries() {
        assert_eq!(seed_faqs().len(), 5);
    }

    #[test]
    fn first_entry_covers_ordering() {
        assert!(seed_faqs()[0].question.contains("đặt hàng"));
    }
}
