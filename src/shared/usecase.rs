use spcal_infra::SpcalContext;
use std::fmt::Debug;
use tracing::error;

pub trait UseCase: Debug {
    type Response;
    type Errors;

    const NAME: &'static str;

    fn execute(&mut self, ctx: &SpcalContext) -> Result<Self::Response, Self::Errors>;
}

#[tracing::instrument(name = "Executing usecase", skip(usecase, ctx))]
pub fn execute<U>(mut usecase: U, ctx: &SpcalContext) -> Result<U::Response, U::Errors>
where
    U: UseCase,
    U::Errors: Debug,
{
    let res = usecase.execute(ctx);

    if let Err(e) = &res {
        error!("Use case {} error: {:?}", U::NAME, e);
    }

    res
}
