/// How many posts a member may make in the introduction channel before it
/// gets reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntroPolicy {
    pub allowed_posts: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Allowed,
    Exceeded { total: usize },
}

impl Default for IntroPolicy {
    fn default() -> Self {
        Self { allowed_posts: 1 }
    }
}

impl IntroPolicy {
    pub fn new(allowed_posts: usize) -> Self {
        Self {
            allowed_posts: allowed_posts.max(1),
        }
    }

    pub fn evaluate(&self, total: usize) -> Verdict {
        if total <= self.allowed_posts {
            Verdict::Allowed
        } else {
            Verdict::Exceeded { total }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_post_is_allowed() {
        let policy = IntroPolicy::default();
        assert_eq!(policy.evaluate(0), Verdict::Allowed);
        assert_eq!(policy.evaluate(1), Verdict::Allowed);
        assert_eq!(policy.evaluate(2), Verdict::Exceeded { total: 2 });
        assert_eq!(policy.evaluate(7), Verdict::Exceeded { total: 7 });
    }

    #[test]
    fn test_custom_allowance() {
        let policy = IntroPolicy::new(3);
        assert_eq!(policy.evaluate(3), Verdict::Allowed);
        assert_eq!(policy.evaluate(4), Verdict::Exceeded { total: 4 });

        // Zero would report every first post.
        assert_eq!(IntroPolicy::new(0).allowed_posts, 1);
    }
}
