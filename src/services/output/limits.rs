//! 验证器描述字符串到上下限数值的推导
//!
//! 框架把测量项的验证规则序列化为自由格式描述字符串，
//! 报告中需要的上下限只能从这些字符串重新拆出来。

/// 从验证器描述推导出的上下限对
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Limits {
    /// 下限
    pub low: Option<f64>,
    /// 上限
    pub high: Option<f64>,
}

impl Limits {
    /// 是否未推导出任何限值
    pub fn is_empty(&self) -> bool {
        self.low.is_none() && self.high.is_none()
    }
}

/// 解析单个数值token；失败时记录debug日志并返回None
fn parse_limit_token(token: &str) -> Option<f64> {
    match token.parse::<f64>() {
        Ok(value) => Some(value),
        Err(_) => {
            log::debug!("无法解析的限值token: {:?}", token);
            None
        }
    }
}

/// 从验证器描述字符串推导上下限
///
/// 仅当记录中恰好有一个验证器时才推导，识别三种形态：
/// * `"10.0 <= x"` → 仅下限
/// * `"x <= 20.0"` → 仅上限
/// * `"10.0 <= x <= 20.0"` → 上下限
///
/// 其余形态（范围外比较符、多个验证器、无验证器）不产生限值。
pub fn limits_from_validators(validators: &[String]) -> Limits {
    let mut limits = Limits::default();
    if validators.len() != 1 {
        return limits;
    }

    let tokens: Vec<&str> = validators[0].split_whitespace().collect();
    match tokens.as_slice() {
        [low, "<=", "x"] => {
            limits.low = parse_limit_token(low);
        }
        ["x", "<=", high] => {
            limits.high = parse_limit_token(high);
        }
        [low, "<=", "x", "<=", high] => {
            limits.low = parse_limit_token(low);
            limits.high = parse_limit_token(high);
        }
        _ => {}
    }
    limits
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 测试仅下限形态
    #[test]
    fn test_low_limit_only() {
        let limits = limits_from_validators(&["10.0 <= x".to_string()]);
        assert_eq!(limits.low, Some(10.0));
        assert_eq!(limits.high, None);
    }

    /// 测试仅上限形态
    #[test]
    fn test_high_limit_only() {
        let limits = limits_from_validators(&["x <= 20.5".to_string()]);
        assert_eq!(limits.low, None);
        assert_eq!(limits.high, Some(20.5));
    }

    /// 测试上下限区间形态
    #[test]
    fn test_range_limits() {
        let limits = limits_from_validators(&["10.0 <= x <= 20.0".to_string()]);
        assert_eq!(limits.low, Some(10.0));
        assert_eq!(limits.high, Some(20.0));
    }

    /// 测试负数与整数token
    #[test]
    fn test_negative_and_integer_tokens() {
        let limits = limits_from_validators(&["-5 <= x <= 5".to_string()]);
        assert_eq!(limits.low, Some(-5.0));
        assert_eq!(limits.high, Some(5.0));
    }

    /// 测试无验证器与多验证器均不推导限值
    #[test]
    fn test_no_or_multiple_validators() {
        assert!(limits_from_validators(&[]).is_empty());

        let multiple = vec!["10.0 <= x".to_string(), "x <= 20.0".to_string()];
        assert!(limits_from_validators(&multiple).is_empty());
    }

    /// 测试无法识别的形态
    #[test]
    fn test_unrecognized_shapes() {
        assert!(limits_from_validators(&["x in [1, 2, 3]".to_string()]).is_empty());
        assert!(limits_from_validators(&["10 < x < 20".to_string()]).is_empty());
        assert!(limits_from_validators(&["matches regex ^ab$".to_string()]).is_empty());
    }

    /// 测试数值解析失败的token按无限值处理
    #[test]
    fn test_unparsable_tokens() {
        let limits = limits_from_validators(&["abc <= x <= 20.0".to_string()]);
        assert_eq!(limits.low, None);
        assert_eq!(limits.high, Some(20.0));
    }
}
