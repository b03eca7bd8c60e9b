//! Finds marked types in a parsed source file and works out how to build them.

use crate::error::GenerationError;

use quote::ToTokens;
use syn::ext::IdentExt;
use syn::{
  parse_quote, FnArg, GenericArgument, Ident, ImplItem, ImplItemFn, Item, ItemImpl, ItemMod,
  Pat, PathArguments, ReturnType, Type, TypePath, Visibility,
};

/// The marker trait a type implements to request a generated factory.
const MARKER: &str = "FactoryGenerated";

/// A marked type that can get a generated factory.
#[derive(Debug)]
pub(crate) struct Target {
  /// Inline modules enclosing the type, outermost first.
  pub(crate) module: Vec<Ident>,
  pub(crate) name: Ident,
  pub(crate) visibility: Visibility,
  pub(crate) constructor: Ident,
  pub(crate) parameters: Vec<Dependency>,
  /// The constructor returns `Result<Self, E>`.
  pub(crate) fallible: bool,
}

/// One constructor parameter, resolved as `Arc<ty>`.
#[derive(Debug)]
pub(crate) struct Dependency {
  pub(crate) name: String,
  pub(crate) ty: Type,
}

/// Scans `file` for `impl FactoryGenerated for T {}` and returns one outcome
/// per marker, in source order. Inline modules are scanned as their own
/// namespace.
pub(crate) fn scan(file: &syn::File) -> Vec<Result<Target, GenerationError>> {
  let mut outcomes = Vec::new();
  scan_items(&file.items, &mut Vec::new(), &mut outcomes);
  outcomes
}

fn scan_items(
  items: &[Item],
  module: &mut Vec<Ident>,
  outcomes: &mut Vec<Result<Target, GenerationError>>,
) {
  for item in items {
    if let Some(marker) = marker(item) {
      outcomes.push(target(items, module, marker));
    } else if let Item::Mod(ItemMod {
      ident,
      content: Some((_, nested)),
      ..
    }) = item
    {
      module.push(ident.clone());
      scan_items(nested, module, outcomes);
      module.pop();
    }
  }
}

fn marker(item: &Item) -> Option<&ItemImpl> {
  let Item::Impl(item_impl) = item else {
    return None;
  };
  let (_, path, _) = item_impl.trait_.as_ref()?;
  let is_marker = path
    .segments
    .last()
    .map_or(false, |segment| segment.ident == MARKER);
  (is_marker && item_impl.items.is_empty()).then_some(item_impl)
}

fn target(items: &[Item], module: &[Ident], marker: &ItemImpl) -> Result<Target, GenerationError> {
  let name = target_name(marker)?;

  let constructors: Vec<&ImplItemFn> = inherent_impls(items, &name)
    .flat_map(|item_impl| item_impl.items.iter())
    .filter_map(|item| match item {
      ImplItem::Fn(function) => Some(function),
      _ => None,
    })
    .filter(|function| is_public_constructor(function, &name))
    .collect();

  let [constructor] = constructors.as_slice() else {
    return Err(GenerationError::ConstructorCount {
      type_name: name.to_string(),
      found: constructors.len(),
    });
  };

  let parameters = constructor
    .sig
    .inputs
    .iter()
    .enumerate()
    .map(|(index, input)| dependency(index, input, &name, &constructor.sig.ident))
    .collect::<Result<Vec<_>, _>>()?;

  Ok(Target {
    module: module.to_vec(),
    visibility: visibility(items, &name),
    constructor: constructor.sig.ident.clone(),
    fallible: construction(&constructor.sig.output, &name) == Some(Construction::Fallible),
    parameters,
    name,
  })
}

fn target_name(marker: &ItemImpl) -> Result<Ident, GenerationError> {
  let type_name = || marker.self_ty.to_token_stream().to_string();
  let unsupported = |reason| GenerationError::UnsupportedType {
    type_name: type_name(),
    reason,
  };

  match &*marker.self_ty {
    Type::TraitObject(_) => Err(GenerationError::Abstract {
      type_name: type_name(),
    }),
    Type::Path(TypePath { qself: None, path }) => {
      if !marker.generics.params.is_empty() {
        return Err(unsupported("generic types are not supported"));
      }
      match path.get_ident() {
        Some(ident) => Ok(ident.clone()),
        None if path.segments.iter().any(|s| !s.arguments.is_empty()) => {
          Err(unsupported("generic types are not supported"))
        }
        None => Err(unsupported(
          "the type must be declared in the scanned module and named by its identifier",
        )),
      }
    }
    _ => Err(unsupported("only named structs and enums are supported")),
  }
}

fn inherent_impls<'a>(items: &'a [Item], name: &'a Ident) -> impl Iterator<Item = &'a ItemImpl> {
  items.iter().filter_map(move |item| match item {
    Item::Impl(item_impl)
      if item_impl.trait_.is_none()
        && item_impl.generics.params.is_empty()
        && names(&item_impl.self_ty, name) =>
    {
      Some(item_impl)
    }
    _ => None,
  })
}

fn is_public_constructor(function: &ImplItemFn, name: &Ident) -> bool {
  matches!(function.vis, Visibility::Public(_))
    && function.sig.receiver().is_none()
    && construction(&function.sig.output, name).is_some()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Construction {
  Infallible,
  Fallible,
}

/// How a function returning `output` builds `name`, if it does.
fn construction(output: &ReturnType, name: &Ident) -> Option<Construction> {
  let ReturnType::Type(_, ty) = output else {
    return None;
  };
  if names_self(ty, name) {
    return Some(Construction::Infallible);
  }

  let Type::Path(TypePath { qself: None, path }) = &**ty else {
    return None;
  };
  let segment = path.segments.last()?;
  if segment.ident != "Result" {
    return None;
  }
  let PathArguments::AngleBracketed(arguments) = &segment.arguments else {
    return None;
  };
  match arguments.args.first() {
    Some(GenericArgument::Type(ok)) if names_self(ok, name) => Some(Construction::Fallible),
    _ => None,
  }
}

fn names_self(ty: &Type, name: &Ident) -> bool {
  match ty {
    Type::Path(TypePath { qself: None, path }) => path
      .get_ident()
      .map_or(false, |ident| ident == "Self" || ident == name),
    _ => false,
  }
}

fn is_self(ty: &Type) -> bool {
  match ty {
    Type::Path(TypePath { qself: None, path }) => {
      path.get_ident().map_or(false, |ident| ident == "Self")
    }
    _ => false,
  }
}

fn names(ty: &Type, name: &Ident) -> bool {
  match ty {
    Type::Path(TypePath { qself: None, path }) => path.get_ident() == Some(name),
    _ => false,
  }
}

fn dependency(
  index: usize,
  input: &FnArg,
  owner: &Ident,
  constructor: &Ident,
) -> Result<Dependency, GenerationError> {
  let unsupported = |parameter: String| GenerationError::UnsupportedParameter {
    type_name: owner.to_string(),
    constructor: constructor.to_string(),
    parameter,
  };

  let FnArg::Typed(typed) = input else {
    return Err(unsupported("self".to_string()));
  };
  let name = match &*typed.pat {
    Pat::Ident(pat) => pat.ident.unraw().to_string(),
    _ => format!("arg{}", index),
  };

  match arc_inner(&typed.ty) {
    // Inside the generated impl `Self` is the factory, so name the type.
    Some(ty) if is_self(ty) => Ok(Dependency {
      name,
      ty: parse_quote!(#owner),
    }),
    Some(ty) => Ok(Dependency {
      name,
      ty: ty.clone(),
    }),
    None => Err(unsupported(name)),
  }
}

/// `T` for a parameter typed `Arc<T>` (under any path).
fn arc_inner(ty: &Type) -> Option<&Type> {
  let Type::Path(TypePath { qself: None, path }) = ty else {
    return None;
  };
  let segment = path.segments.last()?;
  if segment.ident != "Arc" {
    return None;
  }
  let PathArguments::AngleBracketed(arguments) = &segment.arguments else {
    return None;
  };
  match (arguments.args.len(), arguments.args.first()) {
    (1, Some(GenericArgument::Type(inner))) => Some(inner),
    _ => None,
  }
}

/// The visibility of the struct or enum declaring `name`, `pub` if the type is
/// not declared in the same module.
fn visibility(items: &[Item], name: &Ident) -> Visibility {
  items
    .iter()
    .find_map(|item| match item {
      Item::Struct(item) if item.ident == *name => Some(item.vis.clone()),
      Item::Enum(item) if item.ident == *name => Some(item.vis.clone()),
      _ => None,
    })
    .unwrap_or_else(|| parse_quote!(pub))
}
