//! 核心宏定义
//!
//! 提供统一的宏来减少配置结构体的样板代码

/// 为结构体实现Default trait的宏
///
/// 使用示例:
/// ```rust
/// use pose_pebbles::impl_default;
///
/// struct CanvasSize {
///     width: u32,
///     height: u32,
/// }
///
/// impl_default!(CanvasSize {
///     width: 640,
///     height: 480,
/// });
///
/// assert_eq!(CanvasSize::default().width, 640);
/// ```
#[macro_export]
macro_rules! impl_default {
    ($struct_name:ident {
        $($field:ident: $value:expr),* $(,)?
    }) => {
        impl Default for $struct_name {
            fn default() -> Self {
                Self {
                    $($field: $value),*
                }
            }
        }
    };
}

#[cfg(test)]
mod tests {

    struct Margins {
        top: u32,
        label: String,
    }

    impl_default!(Margins {
        top: 4,
        label: "floor".to_string(),
    });

    #[test]
    fn test_impl_default() {
        let m = Margins::default();

        assert_eq!(m.top, 4);
        assert_eq!(m.label, "floor");
    }
}
