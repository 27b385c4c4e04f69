/// How an artifact input is presented to the function argument.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum InputCoercion {
  /// The materialized value itself.
  #[default]
  Value,
  /// The full artifact handle (reference, value, local path).
  Handle,
  /// The local path the artifact was materialized to.
  Path,
}

/// How a declared function parameter is satisfied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamBinding {
  /// From a declared input or parameter of the run spec.
  Data(InputCoercion),
  /// Injected execution context, when no declared input supplies it.
  Context,
  /// Injected inbound event body, when no declared input supplies it.
  Event,
}

/// One declared parameter of the user function's signature.
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
  pub name: String,
  pub required: bool,
  pub binding: ParamBinding,
}

impl Param {
  /// A required data parameter taking the materialized value.
  pub fn data(name: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      required: true,
      binding: ParamBinding::Data(InputCoercion::Value),
    }
  }

  /// A required data parameter with an explicit coercion.
  pub fn data_as(name: impl Into<String>, coercion: InputCoercion) -> Self {
    Self {
      name: name.into(),
      required: true,
      binding: ParamBinding::Data(coercion),
    }
  }

  /// An optional data parameter.
  pub fn optional(name: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      required: false,
      binding: ParamBinding::Data(InputCoercion::Value),
    }
  }

  /// A parameter receiving the injected execution context.
  pub fn context(name: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      required: false,
      binding: ParamBinding::Context,
    }
  }

  /// A parameter receiving the injected inbound event.
  pub fn event(name: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      required: false,
      binding: ParamBinding::Event,
    }
  }
}

/// The declared signature of a user function: its parameters in order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FunctionSignature {
  pub params: Vec<Param>,
}

impl FunctionSignature {
  pub fn new(params: Vec<Param>) -> Self {
    Self { params }
  }

  /// Look up a parameter by name.
  pub fn param(&self, name: &str) -> Option<&Param> {
    self.params.iter().find(|p| p.name == name)
  }

  /// Names of required data parameters.
  pub fn required_data_params(&self) -> impl Iterator<Item = &str> {
    self
      .params
      .iter()
      .filter(|p| p.required && matches!(p.binding, ParamBinding::Data(_)))
      .map(|p| p.name.as_str())
  }
}
