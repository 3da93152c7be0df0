use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::parse::Parser;
use syn::punctuated::Punctuated;
use syn::{parse_macro_input, Expr, ExprLit, ItemFn, Lit, LitInt, MetaNameValue, Token};

/// Run an `async fn` test on a fresh scheduler whose task panics surface
/// through join handles instead of aborting the test binary.
#[proc_macro_attribute]
pub fn test(attr: TokenStream, item: TokenStream) -> TokenStream {
    expand(attr, item, MacroKind::Test)
}

/// Run an `async fn main` as the root task of a default scheduler.
#[proc_macro_attribute]
pub fn main(attr: TokenStream, item: TokenStream) -> TokenStream {
    expand(attr, item, MacroKind::Main)
}

enum MacroKind {
    Test,
    Main,
}

#[derive(Default)]
struct MacroArgs {
    worker_threads: Option<LitInt>,
}

fn parse_args(attr: TokenStream) -> syn::Result<MacroArgs> {
    let mut args = MacroArgs::default();
    let metas = Punctuated::<MetaNameValue, Token![,]>::parse_terminated.parse(attr)?;

    for meta in metas {
        if !meta.path.is_ident("worker_threads") {
            return Err(syn::Error::new_spanned(
                &meta.path,
                "unknown argument, expected `worker_threads = N`",
            ));
        }
        match &meta.value {
            Expr::Lit(ExprLit {
                lit: Lit::Int(lit), ..
            }) => args.worker_threads = Some(lit.clone()),
            other => {
                return Err(syn::Error::new_spanned(
                    other,
                    "`worker_threads` expects an integer literal",
                ))
            }
        }
    }

    Ok(args)
}

fn expand(attr: TokenStream, item: TokenStream, kind: MacroKind) -> TokenStream {
    let args = match parse_args(attr) {
        Ok(args) => args,
        Err(err) => return err.to_compile_error().into(),
    };

    let input = parse_macro_input!(item as ItemFn);

    if input.sig.asyncness.is_none() {
        return syn::Error::new_spanned(
            input.sig.fn_token,
            "core_async attribute macros require `async fn`",
        )
        .to_compile_error()
        .into();
    }

    let mut sig = input.sig.clone();
    sig.asyncness = None;

    let attrs = input.attrs;
    let vis = input.vis;
    let block = input.block;

    let worker_threads = args
        .worker_threads
        .map(|lit| quote! { .with_worker_threads(#lit) });

    let (test_attr, policy) = match kind {
        MacroKind::Test => (
            quote! { #[test] },
            quote! { core_async::fault::FaultPolicy::Isolate },
        ),
        MacroKind::Main => (
            TokenStream2::new(),
            quote! { core_async::fault::FaultPolicy::Abort },
        ),
    };

    quote! {
        #(#attrs)*
        #test_attr
        #vis #sig {
            let config = core_async::runtime::SchedulerConfig::default()
                .with_fault_policy(#policy)
                #worker_threads;
            core_async::runtime::Scheduler::new(config)
                .expect("core_async: failed to build scheduler")
                .block_on(async move #block)
        }
    }
    .into()
}
