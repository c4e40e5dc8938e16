use gdbpilot_engine::StartParameters;

/// Configuration of a debugging session.
#[derive(Debug, PartialEq, knus::Decode)]
pub struct SessionConfig {
    /// Debugger program.
    #[knus(child, default = "gdb".to_owned(), unwrap(argument))]
    pub gdb: String,

    /// Extra debugger arguments.
    #[knus(children(name = "gdb-arg"))]
    pub gdb_args: Vec<GdbArg>,

    /// Whether to start the inferior with `-exec-continue`.
    #[knus(child, default, unwrap(argument))]
    pub use_continue_instead_of_run: bool,

    /// Whether to record the inferior execution once started.
    #[knus(child, default, unwrap(argument))]
    pub reverse_debugging: bool,

    /// Environment variables of the debugger.
    #[knus(children(name = "env"))]
    pub env: Vec<EnvVar>,

    /// Working directory of the debugger.
    #[knus(child, unwrap(argument))]
    pub working_dir: Option<String>,
}

/// Extra debugger argument.
#[derive(Debug, PartialEq, knus::Decode)]
pub struct GdbArg {
    /// Argument value.
    #[knus(argument)]
    pub value: String,
}

/// Environment variable of the debugger.
#[derive(Debug, PartialEq, knus::Decode)]
pub struct EnvVar {
    /// Variable name.
    #[knus(argument)]
    pub key: String,

    /// Variable value.
    #[knus(argument)]
    pub value: String,
}

impl SessionConfig {
    /// Applies this configuration on top of `params`.
    pub fn apply(self, params: StartParameters) -> StartParameters {
        let params = self
            .gdb_args
            .into_iter()
            .fold(params.debugger(self.gdb), |params, arg| {
                params.debugger_arg(arg.value)
            })
            .envs(self.env.into_iter().map(|var| (var.key, var.value)))
            .use_continue_instead_of_run(self.use_continue_instead_of_run)
            .reverse_debugging(self.reverse_debugging);

        match self.working_dir {
            Some(dir) => params.current_dir(dir),
            None => params,
        }
    }
}

#[cfg(test)]
mod tests {
    use gdbpilot_engine::StartParameters;

    use super::{EnvVar, GdbArg, SessionConfig};

    #[test]
    fn parse_from_kdl_defaults() {
        let config = knus::parse::<SessionConfig>("<content>", "")
            .map_err(miette::Report::new)
            .expect("parse kdl");

        assert_eq!(
            config,
            SessionConfig {
                gdb: "gdb".to_owned(),
                gdb_args: vec![],
                use_continue_instead_of_run: false,
                reverse_debugging: false,
                env: vec![],
                working_dir: None,
            }
        );
    }

    #[test]
    fn parse_from_kdl_full() {
        let config = knus::parse::<SessionConfig>(
            "<content>",
            indoc::indoc! {r#"
                gdb "/usr/bin/gdb-multiarch"
                gdb-arg "-iex"
                gdb-arg "set debuginfod enabled off"
                use-continue-instead-of-run true
                reverse-debugging true
                env "LC_ALL" "C"
                working-dir "/tmp"
            "#},
        )
        .map_err(miette::Report::new)
        .expect("parse kdl");

        assert_eq!(
            config,
            SessionConfig {
                gdb: "/usr/bin/gdb-multiarch".to_owned(),
                gdb_args: vec![
                    GdbArg {
                        value: "-iex".to_owned()
                    },
                    GdbArg {
                        value: "set debuginfod enabled off".to_owned()
                    },
                ],
                use_continue_instead_of_run: true,
                reverse_debugging: true,
                env: vec![EnvVar {
                    key: "LC_ALL".to_owned(),
                    value: "C".to_owned(),
                }],
                working_dir: Some("/tmp".to_owned()),
            }
        );
    }

    #[test]
    fn apply_to_start_parameters() {
        let config = knus::parse::<SessionConfig>(
            "<content>",
            indoc::indoc! {r#"
                gdb "gdb-multiarch"
                gdb-arg "-q"
                reverse-debugging true
                working-dir "/tmp"
            "#},
        )
        .map_err(miette::Report::new)
        .expect("parse kdl");

        let params = config.apply(StartParameters::attach(4242));

        assert!(params.reverse_debugging);
        assert!(!params.use_continue_instead_of_run);

        let spec = params.launch_spec();
        assert_eq!(spec.program.to_str(), Some("gdb-multiarch"));
        assert_eq!(spec.args.last().map(String::as_str), Some("-q"));
        assert_eq!(spec.current_dir.as_deref().and_then(|d| d.to_str()), Some("/tmp"));
    }
}
