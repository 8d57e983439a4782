/// Generates `build_registry`, which registers every listed tool whose
/// configuration section is enabled.
macro_rules! register_tools {
    ( $($tool:path),* $(,)? ) => {
        pub fn build_registry(
            config: &crate::config::Config,
        ) -> Result<crate::mcp::ToolRegistry, crate::mcp::RegistryError> {
            let mut registry = crate::mcp::ToolRegistry::new();
            $(
                if config.is_tool_enabled::<$tool>() {
                    registry.register::<$tool>()?;
                }
            )*
            Ok(registry)
        }
    };
}

pub(crate) use register_tools;
