//! `assume-aws-role` step binary.

// std
use std::process::ExitCode;

fn main() -> ExitCode {
	saml_role_broker::action::main()
}
